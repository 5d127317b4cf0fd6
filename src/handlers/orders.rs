use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::cart::format_money;
use crate::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ShippingAddressBody {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub country: String,
    pub postal_code: Option<String>,
    pub phone: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(b: ShippingAddressBody) -> Self {
        ShippingAddress {
            full_name: b.full_name,
            address_line1: b.address_line1,
            address_line2: b.address_line2,
            city: b.city,
            country: b.country,
            postal_code: b.postal_code,
            phone: b.phone,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressBody {
    fn from(a: ShippingAddress) -> Self {
        ShippingAddressBody {
            full_name: a.full_name,
            address_line1: a.address_line1,
            address_line2: a.address_line2,
            city: a.city,
            country: a.country,
            postal_code: a.postal_code,
            phone: a.phone,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddressBody,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `pending`, `paid`, `shipped`, `delivered`, `cancelled`.
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price_at_purchase: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub total_amount: String,
    pub shipping_address: ShippingAddressBody,
    pub items: Vec<OrderItemResponse>,
    pub payment_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        Self {
            id: i.id,
            product_id: i.product_id,
            variant_id: i.variant_id,
            quantity: i.quantity,
            price_at_purchase: format_money(&i.price_at_purchase),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            order_number: o.order_number,
            status: o.status.to_string(),
            total_amount: format_money(&o.total_amount),
            shipping_address: o.shipping_address.into(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            payment_id: o.payment_id,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders/checkout
///
/// Turns the caller's cart into a pending order. Order, items and the cart
/// deletion are committed in a single database transaction.
#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Cart is empty, a product is unavailable or the address is incomplete"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = user.0;
    let address = ShippingAddress::from(body.into_inner().shipping_address);
    let order = web::block(move || state.orders.checkout(&actor, address)).await??;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders
///
/// The caller's orders, most recent first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Order history", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let actor = user.0;
    let orders = web::block(move || state.orders.list_orders(&actor)).await??;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/orders/{id}
///
/// Returns 404 both for unknown orders and for orders of other users.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = user.0;
    let order_id = path.into_inner();
    let order = web::block(move || state.orders.get_order(&actor, order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}/status
///
/// Admin only.
#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let actor = user.0;
    actor.require_admin()?;
    let order_id = path.into_inner();
    let status: OrderStatus = body.status.parse()?;
    let order =
        web::block(move || state.orders.update_status(&actor, order_id, status)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
