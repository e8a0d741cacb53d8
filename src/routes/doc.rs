use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
        cart::{AddToCartRequest, CartLine, CartView, UpdateCartItemRequest},
        favorites::{AddFavoriteRequest, FavoriteList},
        orders::{
            CheckoutResponse, CreateOrderRequest, OrderItemInput, OrderList, OrderSummary,
            OrderWithItems, ShippingInfo,
        },
        payments::{VerifyPaymentRequest, VerifyPaymentResponse},
        products::ProductList,
    },
    models::{CartItem, Favorite, Order, OrderItem, Product, Review, User},
    response::{ApiResponse, Meta},
    routes::{cart, favorites, health, orders, payments, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::login,
        users::get_profile,
        users::update_profile,
        products::list_products,
        products::featured_products,
        products::new_arrivals,
        products::best_sellers,
        products::related_products,
        products::get_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_cart_item,
        cart::clear_cart,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        favorites::clear_favorites,
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::cancel_order,
        payments::verify_payment
    ),
    components(
        schemas(
            User,
            Product,
            Review,
            Favorite,
            CartItem,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateProfileRequest,
            ProductList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartLine,
            CartView,
            AddFavoriteRequest,
            FavoriteList,
            CreateOrderRequest,
            OrderItemInput,
            ShippingInfo,
            OrderSummary,
            OrderWithItems,
            OrderList,
            CheckoutResponse,
            VerifyPaymentRequest,
            VerifyPaymentResponse,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<FavoriteList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CheckoutResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Registration, login and profile endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Favorites", description = "Favorite endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payments", description = "Payment verification endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
