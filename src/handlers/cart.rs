use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::cart::{format_money, CartView, PricedCartLine};
use crate::errors::AppError;
use crate::state::AppState;

use super::MessageResponse;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    /// Defaults to 1. Must be at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    /// Zero or a negative value removes the line.
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    pub quantity: i32,
    /// Current catalog price, absent when the product is no longer sold.
    pub unit_price: Option<String>,
    pub line_total: String,
    pub available: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartLineResponse>,
    pub total: String,
    pub item_count: usize,
}

impl From<PricedCartLine> for CartLineResponse {
    fn from(priced: PricedCartLine) -> Self {
        Self {
            line_total: format_money(&priced.line_total()),
            available: priced.is_available(),
            unit_price: priced.unit_price.as_ref().map(format_money),
            id: priced.line.id,
            product_id: priced.line.product_id,
            variant_id: priced.line.variant_id,
            quantity: priced.line.quantity,
            created_at: priced.line.created_at.to_rfc3339(),
        }
    }
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            total: format_money(&view.total),
            item_count: view.count,
            items: view.lines.into_iter().map(CartLineResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/cart
///
/// Returns the caller's cart priced at current catalog prices.
#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.user_id;
    let view = web::block(move || state.cart.get_cart(user_id)).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// POST /api/cart/items
///
/// Adds a product to the cart, merging into an existing line for the same
/// product and variant.
#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added", body = MessageResponse),
        (status = 400, description = "Quantity below 1"),
        (status = 404, description = "Product not found"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.user_id;
    let body = body.into_inner();
    web::block(move || {
        state.cart.add_item(
            user_id,
            body.product_id,
            body.variant_id.as_deref(),
            body.quantity,
        )
    })
    .await??;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Item added to cart")))
}

/// PUT /api/cart/items/{id}
#[utoipa::path(
    put,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Cart updated", body = MessageResponse),
        (status = 404, description = "Cart line not found"),
    ),
    tag = "cart"
)]
pub async fn update_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.user_id;
    let line_id = path.into_inner();
    let quantity = body.quantity;
    web::block(move || state.cart.update_item(user_id, line_id, quantity)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Cart updated")))
}

/// DELETE /api/cart/items/{id}
#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Item removed", body = MessageResponse),
        (status = 404, description = "Cart line not found"),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.user_id;
    let line_id = path.into_inner();
    web::block(move || state.cart.remove_item(user_id, line_id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Item removed from cart")))
}

/// DELETE /api/cart/clear
#[utoipa::path(
    delete,
    path = "/api/cart/clear",
    responses(
        (status = 200, description = "Cart cleared", body = MessageResponse),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user_id = user.0.user_id;
    web::block(move || state.cart.clear(user_id)).await??;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Cart cleared")))
}
