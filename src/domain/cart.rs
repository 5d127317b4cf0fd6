use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::Product;
use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with the product's current catalog price.
///
/// `unit_price` is `None` when the product was removed from the catalog or
/// deactivated after the line was added. Such a line contributes nothing to
/// the cart total and blocks checkout.
#[derive(Debug, Clone)]
pub struct PricedCartLine {
    pub line: CartLine,
    pub unit_price: Option<BigDecimal>,
}

impl PricedCartLine {
    pub fn is_available(&self) -> bool {
        self.unit_price.is_some()
    }

    pub fn line_total(&self) -> BigDecimal {
        match &self.unit_price {
            Some(price) => price * BigDecimal::from(self.line.quantity),
            None => BigDecimal::from(0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<PricedCartLine>,
    pub total: BigDecimal,
    pub count: usize,
}

impl CartView {
    pub fn new(lines: Vec<PricedCartLine>) -> Self {
        let total = money(lines.iter().map(PricedCartLine::line_total).sum());
        let count = lines.len();
        Self {
            lines,
            total,
            count,
        }
    }
}

/// Attach current prices to `lines`. Products missing from `products` (or
/// inactive ones) produce an unpriced line rather than an error.
pub fn price_lines(lines: Vec<CartLine>, products: &[Product]) -> Vec<PricedCartLine> {
    let by_id: HashMap<Uuid, &Product> = products.iter().map(|p| (p.id, p)).collect();
    lines
        .into_iter()
        .map(|line| {
            let unit_price = by_id
                .get(&line.product_id)
                .and_then(|p| p.sale_price())
                .cloned();
            PricedCartLine { line, unit_price }
        })
        .collect()
}

pub fn validate_add_quantity(quantity: i32) -> Result<(), DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidInput(format!(
            "quantity must be at least 1, got {}",
            quantity
        )));
    }
    Ok(())
}

/// Quantity of a line after adding `added` to it.
pub fn merged_quantity(existing: i32, added: i32) -> Result<i32, DomainError> {
    existing
        .checked_add(added)
        .ok_or_else(|| DomainError::InvalidInput("line quantity is too large".to_string()))
}

/// Normalise a currency amount to two decimal places.
pub fn money(amount: BigDecimal) -> BigDecimal {
    amount.with_scale(2)
}

/// Two-decimal wire form of a currency amount, e.g. `"0.00"` or `"25.50"`.
pub fn format_money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_plain_string()
}
