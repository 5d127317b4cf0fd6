pub mod admin;
pub mod cart;
pub mod health;
pub mod orders;

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        admin::list_all_orders,
        health::health,
    ),
    components(schemas(
        MessageResponse,
        cart::AddCartItemRequest,
        cart::UpdateCartItemRequest,
        cart::CartLineResponse,
        cart::CartResponse,
        orders::ShippingAddressBody,
        orders::CheckoutRequest,
        orders::UpdateStatusRequest,
        orders::OrderItemResponse,
        orders::OrderResponse,
        admin::AdminOrderListResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "cart", description = "Shopping cart of the calling user"),
        (name = "orders", description = "Checkout and order history"),
        (name = "admin", description = "Administrative order management"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
