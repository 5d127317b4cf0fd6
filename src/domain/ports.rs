use uuid::Uuid;

use super::cart::{CartLine, PricedCartLine};
use super::catalog::Product;
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderPage, OrderStatus};

pub trait CatalogReader: Send + Sync + 'static {
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError>;

    /// Insert a line, or add `quantity` to the existing line for the same
    /// (user, product, variant). Must be atomic under concurrent callers.
    /// A merged quantity that no longer fits is `InvalidInput`.
    fn add_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        variant_id: Option<&str>,
        quantity: i32,
    ) -> Result<CartLine, DomainError>;

    /// Returns `false` when no line with `line_id` belongs to `user_id`.
    fn set_quantity(&self, user_id: Uuid, line_id: Uuid, quantity: i32)
        -> Result<bool, DomainError>;

    /// Returns `false` when no line with `line_id` belongs to `user_id`.
    fn delete_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError>;

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Turn the user's cart into an order as one atomic unit.
    ///
    /// The implementation locks the user's cart lines, prices them once,
    /// hands them to `build`, then persists the returned order with its items
    /// and deletes the cart lines. If `build` or any write fails nothing is
    /// changed.
    fn place<F>(&self, user_id: Uuid, build: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&[PricedCartLine]) -> Result<NewOrder, DomainError>;

    /// Looks up an order by id, but only if `user_id` owns it.
    fn find_for_user(&self, order_id: Uuid, user_id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Most recent first.
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError>;

    /// Atomically read the order's status, let `decide` pick the next one and
    /// write it. `Ok(None)` when the order does not exist.
    fn change_status<F>(&self, order_id: Uuid, decide: F) -> Result<Option<Order>, DomainError>
    where
        F: FnOnce(OrderStatus) -> Result<OrderStatus, DomainError>;

    /// Newest first, skipping `offset` orders.
    fn list(
        &self,
        offset: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError>;
}
