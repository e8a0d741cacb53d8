use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

/// Clients send `productId` either as a bare id or as a populated product
/// object. The union is resolved here, at the data-access boundary, instead
/// of being duck-typed at every call site.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ProductRef {
    Id(Uuid),
    Populated(PopulatedProduct),
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PopulatedProduct {
    #[serde(alias = "_id")]
    pub id: Uuid,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub images: Option<Vec<String>>,
}

impl ProductRef {
    pub fn id(&self) -> Uuid {
        match self {
            ProductRef::Id(id) => *id,
            ProductRef::Populated(product) => product.id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: ProductRef,
    pub name: String,
    pub price: Option<i64>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub quantity: Option<i32>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// The snapshot persisted on the order, independent of later product edits.
#[derive(Debug, Clone)]
pub struct OrderItemSnapshot {
    pub product_id: Uuid,
    pub name: String,
    pub price: i64,
    pub image: String,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl OrderItemInput {
    pub fn resolve(&self) -> OrderItemSnapshot {
        let populated = match &self.product_id {
            ProductRef::Populated(product) => Some(product),
            ProductRef::Id(_) => None,
        };
        let price = self
            .price
            .or_else(|| populated.and_then(|p| p.price))
            .unwrap_or(0);
        let image = self
            .image
            .clone()
            .or_else(|| self.images.as_ref().and_then(|imgs| imgs.first().cloned()))
            .or_else(|| {
                populated
                    .and_then(|p| p.images.as_ref())
                    .and_then(|imgs| imgs.first().cloned())
            })
            .unwrap_or_default();
        OrderItemSnapshot {
            product_id: self.product_id.id(),
            name: self.name.clone(),
            price,
            image,
            quantity: self.quantity.unwrap_or(1),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub subtotal: i64,
    pub shipping: i64,
    pub tax: i64,
    #[serde(default)]
    pub discount: i64,
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    pub shipping_info: Option<ShippingInfo>,
    pub order_summary: Option<OrderSummary>,
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderWithItems>)]
    pub items: Vec<OrderWithItems>,
}

/// Response to order creation; `order_id` is the gateway order id when one
/// was created, otherwise the local order id.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub amount: i64,
    pub order: OrderWithItems,
}
