use bigdecimal::BigDecimal;
use uuid::Uuid;

/// The slice of a catalog product the cart and checkout care about.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: BigDecimal,
    pub is_active: bool,
}

impl Product {
    /// Current price, or `None` when the product can no longer be sold.
    pub fn sale_price(&self) -> Option<&BigDecimal> {
        self.is_active.then_some(&self.price)
    }
}
