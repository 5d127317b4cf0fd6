//! In-memory port implementations for service tests. A single mutex guards
//! the whole store, which gives `place` and `change_status` the same
//! all-or-nothing behaviour as a database transaction.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{self, CartLine, PricedCartLine};
use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderItem, OrderPage, OrderStatus};
use crate::domain::ports::{CartRepository, CatalogReader, OrderRepository};

#[derive(Default)]
struct State {
    products: HashMap<Uuid, Product>,
    lines: Vec<CartLine>,
    orders: Vec<Order>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub fn add_product(&self, price: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().products.insert(
            id,
            Product {
                id,
                title: format!("Product {}", id.simple()),
                price: BigDecimal::from_str(price).expect("valid decimal"),
                is_active: true,
            },
        );
        id
    }

    pub fn set_price(&self, id: Uuid, price: &str) {
        if let Some(p) = self.lock().products.get_mut(&id) {
            p.price = BigDecimal::from_str(price).expect("valid decimal");
        }
    }

    pub fn deactivate_product(&self, id: Uuid) {
        if let Some(p) = self.lock().products.get_mut(&id) {
            p.is_active = false;
        }
    }

    pub fn remove_product(&self, id: Uuid) {
        self.lock().products.remove(&id);
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }
}

impl CatalogReader for InMemoryStore {
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    fn find_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let state = self.lock();
        Ok(ids.iter().filter_map(|id| state.products.get(id).cloned()).collect())
    }
}

impl CartRepository for InMemoryStore {
    fn lines_for_user(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self
            .lock()
            .lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    fn add_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        variant_id: Option<&str>,
        quantity: i32,
    ) -> Result<CartLine, DomainError> {
        let mut state = self.lock();
        if let Some(line) = state.lines.iter_mut().find(|l| {
            l.user_id == user_id && l.product_id == product_id && l.variant_id.as_deref() == variant_id
        }) {
            line.quantity = cart::merged_quantity(line.quantity, quantity)?;
            return Ok(line.clone());
        }
        let line = CartLine {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            variant_id: variant_id.map(str::to_string),
            quantity,
            created_at: Utc::now(),
        };
        state.lines.push(line.clone());
        Ok(line)
    }

    fn set_quantity(&self, user_id: Uuid, line_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let mut state = self.lock();
        match state
            .lines
            .iter_mut()
            .find(|l| l.id == line_id && l.user_id == user_id)
        {
            Some(line) => {
                line.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_line(&self, user_id: Uuid, line_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let before = state.lines.len();
        state
            .lines
            .retain(|l| !(l.id == line_id && l.user_id == user_id));
        Ok(state.lines.len() < before)
    }

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut state = self.lock();
        let before = state.lines.len();
        state.lines.retain(|l| l.user_id != user_id);
        Ok(before - state.lines.len())
    }
}

impl OrderRepository for InMemoryStore {
    fn place<F>(&self, user_id: Uuid, build: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&[PricedCartLine]) -> Result<NewOrder, DomainError>,
    {
        let mut state = self.lock();
        let lines: Vec<CartLine> = state
            .lines
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        let products: Vec<Product> = state.products.values().cloned().collect();
        let priced = cart::price_lines(lines, &products);

        let new_order = build(&priced)?;
        if state
            .orders
            .iter()
            .any(|o| o.order_number == new_order.order_number)
        {
            return Err(DomainError::Conflict("duplicate order number".to_string()));
        }

        let now = Utc::now();
        let order = Order {
            id: new_order.id,
            order_number: new_order.order_number,
            user_id: new_order.user_id,
            status: new_order.status,
            total_amount: new_order.total_amount,
            shipping_address: new_order.shipping_address,
            payment_id: None,
            created_at: now,
            updated_at: now,
            items: new_order
                .items
                .into_iter()
                .map(|i| OrderItem {
                    id: Uuid::new_v4(),
                    order_id: new_order.id,
                    product_id: i.product_id,
                    variant_id: i.variant_id,
                    quantity: i.quantity,
                    price_at_purchase: i.price_at_purchase,
                })
                .collect(),
        };
        state.orders.push(order.clone());
        state.lines.retain(|l| l.user_id != user_id);
        Ok(order)
    }

    fn find_for_user(&self, order_id: Uuid, user_id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self
            .lock()
            .orders
            .iter()
            .find(|o| o.id == order_id && o.user_id == user_id)
            .cloned())
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        // Orders are appended in creation order.
        Ok(self
            .lock()
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn change_status<F>(&self, order_id: Uuid, decide: F) -> Result<Option<Order>, DomainError>
    where
        F: FnOnce(OrderStatus) -> Result<OrderStatus, DomainError>,
    {
        let mut state = self.lock();
        let Some(order) = state.orders.iter_mut().find(|o| o.id == order_id) else {
            return Ok(None);
        };
        order.status = decide(order.status)?;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    fn list(
        &self,
        offset: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError> {
        let state = self.lock();
        let matching: Vec<&Order> = state
            .orders
            .iter()
            .rev()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(OrderPage { items, total })
    }
}
