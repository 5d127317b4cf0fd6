use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::{money, PricedCartLine};
use super::errors::DomainError;

pub const ORDER_NUMBER_PREFIX: &str = "ORD-";
const ORDER_NUMBER_SUFFIX_LEN: usize = 12;
/// Exclusive bound of the `NUMERIC(10,2)` order total column.
const ORDER_TOTAL_CEILING: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Edges of the order lifecycle graph. Self-transitions are not edges.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Shipped) | (Paid, Cancelled) | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown order status '{}'", s)))
    }
}

/// Decide the status an order moves to. With `enforce` off any value is
/// accepted, matching the permissive admin tooling.
pub fn next_status(
    current: OrderStatus,
    requested: OrderStatus,
    enforce: bool,
) -> Result<OrderStatus, DomainError> {
    if enforce && !current.can_transition_to(requested) {
        return Err(DomainError::InvalidState(format!(
            "cannot move order from {} to {}",
            current, requested
        )));
    }
    Ok(requested)
}

/// Shipping address captured at checkout. Stored as a permanent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub phone: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("full_name", &self.full_name),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("country", &self.country),
            ("phone", &self.phone),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "shipping_address.{} must not be blank",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub shipping_address: ShippingAddress,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<Order>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    pub quantity: i32,
    pub price_at_purchase: BigDecimal,
}

/// An order ready to be persisted, priced once from a locked cart.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub shipping_address: ShippingAddress,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build an order from the priced contents of a user's cart.
    ///
    /// Each item's `price_at_purchase` is the same value summed into
    /// `total_amount`, so the total always equals Σ(price × quantity) over
    /// the items.
    pub fn from_cart(
        user_id: Uuid,
        lines: &[PricedCartLine],
        shipping_address: ShippingAddress,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::InvalidState("cart is empty".to_string()));
        }

        let mut items = Vec::with_capacity(lines.len());
        for priced in lines {
            let Some(price) = &priced.unit_price else {
                return Err(DomainError::InvalidState(format!(
                    "product {} is no longer available",
                    priced.line.product_id
                )));
            };
            items.push(NewOrderItem {
                product_id: priced.line.product_id,
                variant_id: priced.line.variant_id.clone(),
                quantity: priced.line.quantity,
                price_at_purchase: price.clone(),
            });
        }

        let total_amount = money(
            items
                .iter()
                .map(|i| &i.price_at_purchase * BigDecimal::from(i.quantity))
                .sum(),
        );
        if total_amount >= BigDecimal::from(ORDER_TOTAL_CEILING) {
            return Err(DomainError::InvalidInput(format!(
                "order total {} exceeds the maximum of {}",
                total_amount,
                ORDER_TOTAL_CEILING - 1
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            order_number: generate_order_number(),
            user_id,
            status: OrderStatus::Pending,
            total_amount,
            shipping_address,
            items,
        })
    }
}

/// `ORD-` followed by uppercase hex taken from a random UUID.
pub fn generate_order_number() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", ORDER_NUMBER_PREFIX, &hex[..ORDER_NUMBER_SUFFIX_LEN])
}
