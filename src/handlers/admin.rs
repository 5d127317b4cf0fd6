use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::domain::order::OrderStatus;
use crate::errors::AppError;
use crate::state::AppState;

use super::orders::OrderResponse;

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdminOrderListParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_per_page")]
    pub per_page: i64,
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderListResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/admin/orders
///
/// Every order in the system, newest first, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
        ("status" = Option<String>, Query, description = "Only orders with this status"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = AdminOrderListResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Caller is not an admin"),
    ),
    tag = "admin"
)]
pub async fn list_all_orders(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<AdminOrderListParams>,
) -> Result<HttpResponse, AppError> {
    let actor = user.0;
    actor.require_admin()?;
    let params = query.into_inner();
    let page = params.page.max(1);
    let per_page = params.per_page.clamp(1, 100);
    let status = params
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let result =
        web::block(move || state.orders.list_all(&actor, page, per_page, status)).await??;

    Ok(HttpResponse::Ok().json(AdminOrderListResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        per_page,
    }))
}
