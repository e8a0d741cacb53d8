use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutResponse, CreateOrderRequest, OrderList, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    if !order_ids.is_empty() {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.is_in(order_ids))
            .all(&state.orm)
            .await?;
        for item in items {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(order_item_from_entity(item));
        }
    }

    let items = orders
        .into_iter()
        .map(|order| {
            let lines = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems {
                order: order_from_entity(order),
                items: lines,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_scoped(state, user, id).await?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("No items in order".into()));
    }
    let shipping_info = payload
        .shipping_info
        .ok_or_else(|| AppError::BadRequest("Shipping information is required".into()))?;
    let order_summary = payload
        .order_summary
        .ok_or_else(|| AppError::BadRequest("Order summary is required".into()))?;

    let order_id = Uuid::new_v4();
    let order_number = build_order_number();

    // The gateway must never block order placement: any failure falls back
    // to a placeholder id and the payment stays pending.
    let gateway_order_id = if payload.payment_method == "razorpay" {
        match &state.gateway {
            Some(gateway) => {
                match gateway
                    .create_order(order_summary.total, "INR", &order_number)
                    .await
                {
                    Ok(remote) => Some(remote.id),
                    Err(err) => {
                        tracing::warn!(error = %err, "gateway order creation failed, using placeholder");
                        Some(placeholder_order_id())
                    }
                }
            }
            None => {
                tracing::warn!("payment gateway not configured, using placeholder order id");
                Some(placeholder_order_id())
            }
        }
    } else {
        None
    };

    let snapshots: Vec<_> = payload.items.iter().map(|item| item.resolve()).collect();

    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        order_number: Set(order_number),
        shipping_info: Set(serde_json::to_value(&shipping_info)
            .map_err(|e| AppError::Internal(e.into()))?),
        order_summary: Set(serde_json::to_value(&order_summary)
            .map_err(|e| AppError::Internal(e.into()))?),
        payment_method: Set(payload.payment_method.clone()),
        payment_status: Set("pending".into()),
        order_status: Set("processing".into()),
        gateway_order_id: Set(gateway_order_id.clone()),
        gateway_payment_id: Set(None),
        gateway_signature: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(snapshot.product_id),
            name: Set(snapshot.name),
            price: Set(snapshot.price),
            image: Set(snapshot.image),
            quantity: Set(snapshot.quantity),
            size: Set(snapshot.size),
            color: Set(snapshot.color),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_create",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "order_number": order.order_number })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let response = CheckoutResponse {
        order_id: gateway_order_id.unwrap_or_else(|| order.id.to_string()),
        amount: order_summary.total,
        order: OrderWithItems {
            order: order_from_entity(order),
            items,
        },
    };

    Ok(ApiResponse::success("Order created", response, None))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = find_scoped(state, user, id).await?;

    if order.order_status != "processing" {
        return Err(AppError::BadRequest(format!(
            "Order cannot be cancelled in {} status",
            order.order_status
        )));
    }

    let mut active: OrderActive = order.into();
    active.order_status = Set("cancelled".into());
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_cancel",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order cancelled successfully",
        order_from_entity(order),
        None,
    ))
}

pub(crate) async fn find_scoped(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<OrderModel> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;

    match order {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        order_number: model.order_number,
        shipping_info: model.shipping_info,
        order_summary: model.order_summary,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        order_status: model.order_status,
        gateway_order_id: model.gateway_order_id,
        gateway_payment_id: model.gateway_payment_id,
        gateway_signature: model.gateway_signature,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        name: model.name,
        price: model.price,
        image: model.image,
        quantity: model.quantity,
        size: model.size,
        color: model.color,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Timestamp plus random suffix; the unique index on order_number is the
/// actual uniqueness authority.
fn build_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1000);
    format!("ORD-{millis}-{suffix}")
}

fn placeholder_order_id() -> String {
    format!("mock_order_{}", Utc::now().timestamp_millis())
}
