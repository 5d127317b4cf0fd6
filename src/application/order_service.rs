use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::identity::Actor;
use crate::domain::order::{self, NewOrder, Order, OrderPage, OrderStatus, ShippingAddress};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
    enforce_transitions: bool,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, enforce_transitions: bool) -> Self {
        Self {
            repo,
            enforce_transitions,
        }
    }

    /// Convert the caller's cart into a pending order at current prices and
    /// empty the cart, all or nothing.
    pub fn checkout(&self, actor: &Actor, shipping_address: ShippingAddress) -> Result<Order, DomainError> {
        shipping_address.validate()?;
        let user_id = actor.user_id;
        let order = self
            .repo
            .place(user_id, |lines| NewOrder::from_cart(user_id, lines, shipping_address))?;
        log::info!(
            "Order {} placed by user {} with {} items, total {}",
            order.order_number,
            user_id,
            order.items.len(),
            order.total_amount
        );
        Ok(order)
    }

    pub fn get_order(&self, actor: &Actor, order_id: Uuid) -> Result<Order, DomainError> {
        self.repo
            .find_for_user(order_id, actor.user_id)?
            .ok_or(DomainError::NotFound)
    }

    pub fn list_orders(&self, actor: &Actor) -> Result<Vec<Order>, DomainError> {
        self.repo.list_for_user(actor.user_id)
    }

    pub fn update_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        requested: OrderStatus,
    ) -> Result<Order, DomainError> {
        actor.require_admin()?;
        let enforce = self.enforce_transitions;
        let updated = self
            .repo
            .change_status(order_id, |current| {
                order::next_status(current, requested, enforce).map_err(|e| {
                    log::warn!("Rejected status change on order {}: {}", order_id, e);
                    e
                })
            })?
            .ok_or(DomainError::NotFound)?;
        log::info!(
            "Order {} moved to {} by admin {}",
            updated.order_number,
            updated.status,
            actor.user_id
        );
        Ok(updated)
    }

    /// Every order in the system, newest first. Admin only.
    pub fn list_all(
        &self,
        actor: &Actor,
        page: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError> {
        actor.require_admin()?;
        let limit = limit.clamp(1, 100);
        let offset = (page.max(1) - 1)
            .checked_mul(limit)
            .ok_or_else(|| DomainError::InvalidInput(format!("page {} is out of range", page)))?;
        self.repo.list(offset, limit, status)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::cart_service::CartService;
    use crate::application::in_memory::InMemoryStore;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Omar Khalil".to_string(),
            address_line1: "4 Rainbow Street".to_string(),
            address_line2: Some("Apt 2".to_string()),
            city: "Amman".to_string(),
            country: "JO".to_string(),
            postal_code: None,
            phone: "+962711111111".to_string(),
        }
    }

    struct Fixture {
        store: InMemoryStore,
        carts: CartService<InMemoryStore, InMemoryStore>,
        orders: OrderService<InMemoryStore>,
    }

    fn fixture(enforce: bool) -> Fixture {
        let store = InMemoryStore::default();
        Fixture {
            carts: CartService::new(store.clone(), store.clone()),
            orders: OrderService::new(store.clone(), enforce),
            store,
        }
    }

    fn placed_order(f: &Fixture, user: &Actor) -> Order {
        let product = f.store.add_product("3.00");
        f.carts.add_item(user.user_id, product, None, 1).unwrap();
        f.orders.checkout(user, address()).unwrap()
    }

    #[test]
    fn checkout_example_scenario() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let p1 = f.store.add_product("10.00");
        let p2 = f.store.add_product("5.50");
        f.carts.add_item(user.user_id, p1, None, 2).unwrap();
        f.carts.add_item(user.user_id, p2, None, 1).unwrap();
        assert_eq!(f.carts.get_cart(user.user_id).unwrap().total, dec("25.50"));

        let order = f.orders.checkout(&user, address()).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, dec("25.50"));
        assert_eq!(order.user_id, user.user_id);
        assert_eq!(order.shipping_address, address());
        assert_eq!(order.items.len(), 2);
        let p1_item = order.items.iter().find(|i| i.product_id == p1).unwrap();
        let p2_item = order.items.iter().find(|i| i.product_id == p2).unwrap();
        assert_eq!(p1_item.price_at_purchase, dec("10.00"));
        assert_eq!(p1_item.quantity, 2);
        assert_eq!(p2_item.price_at_purchase, dec("5.50"));
        assert_eq!(f.carts.get_cart(user.user_id).unwrap().count, 0);
    }

    #[test]
    fn order_total_matches_items() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        for (price, qty) in [("0.99", 3), ("19.95", 2), ("100.00", 1)] {
            let p = f.store.add_product(price);
            f.carts.add_item(user.user_id, p, None, qty).unwrap();
        }

        let order = f.orders.checkout(&user, address()).unwrap();

        let sum: BigDecimal = order
            .items
            .iter()
            .map(|i| &i.price_at_purchase * BigDecimal::from(i.quantity))
            .sum();
        assert_eq!(order.total_amount, sum);
        assert_eq!(order.total_amount, dec("142.87"));
    }

    #[test]
    fn checkout_empty_cart_is_invalid_state_and_changes_nothing() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());

        let err = f.orders.checkout(&user, address()).unwrap_err();

        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(f.store.order_count(), 0);
    }

    #[test]
    fn checkout_with_unavailable_product_keeps_cart() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let p1 = f.store.add_product("1.00");
        let p2 = f.store.add_product("2.00");
        f.carts.add_item(user.user_id, p1, None, 1).unwrap();
        f.carts.add_item(user.user_id, p2, None, 1).unwrap();
        f.store.deactivate_product(p2);

        let err = f.orders.checkout(&user, address()).unwrap_err();

        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(f.store.order_count(), 0);
        assert_eq!(f.carts.get_cart(user.user_id).unwrap().count, 2);
    }

    #[test]
    fn checkout_with_blank_address_is_invalid_input() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let p = f.store.add_product("1.00");
        f.carts.add_item(user.user_id, p, None, 1).unwrap();
        let mut addr = address();
        addr.phone = String::new();

        let err = f.orders.checkout(&user, addr).unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(f.carts.get_cart(user.user_id).unwrap().count, 1);
    }

    #[test]
    fn later_price_change_does_not_touch_placed_order() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let p = f.store.add_product("10.00");
        f.carts.add_item(user.user_id, p, None, 3).unwrap();
        let order = f.orders.checkout(&user, address()).unwrap();

        f.store.set_price(p, "99.00");

        let reread = f.orders.get_order(&user, order.id).unwrap();
        assert_eq!(reread.total_amount, dec("30.00"));
        assert_eq!(reread.items[0].price_at_purchase, dec("10.00"));
    }

    #[test]
    fn concurrent_checkouts_create_one_order() {
        let f = Arc::new(fixture(true));
        let user = Actor::user(Uuid::new_v4());
        let p = f.store.add_product("8.00");
        f.carts.add_item(user.user_id, p, None, 1).unwrap();

        let results: Vec<Result<Order, DomainError>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let f = Arc::clone(&f);
                    s.spawn(move || f.orders.checkout(&user, address()))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::InvalidState(_)))));
        assert_eq!(f.store.order_count(), 1);
    }

    #[test]
    fn get_order_of_other_user_is_not_found() {
        let f = fixture(true);
        let owner = Actor::user(Uuid::new_v4());
        let order = placed_order(&f, &owner);

        let err = f
            .orders
            .get_order(&Actor::user(Uuid::new_v4()), order.id)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));

        let missing = f.orders.get_order(&owner, Uuid::new_v4()).unwrap_err();
        assert!(matches!(missing, DomainError::NotFound));
    }

    #[test]
    fn list_orders_is_newest_first_and_scoped_to_user() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let first = placed_order(&f, &user);
        let second = placed_order(&f, &user);
        placed_order(&f, &Actor::user(Uuid::new_v4()));

        let listed = f.orders.list_orders(&user).unwrap();

        let ids: Vec<Uuid> = listed.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn list_orders_for_new_user_is_empty() {
        let f = fixture(true);
        assert!(f
            .orders
            .list_orders(&Actor::user(Uuid::new_v4()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn non_admin_cannot_update_status() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let order = placed_order(&f, &user);

        let err = f
            .orders
            .update_status(&user, order.id, OrderStatus::Paid)
            .unwrap_err();

        assert!(matches!(err, DomainError::Forbidden));
        assert_eq!(
            f.orders.get_order(&user, order.id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn admin_walks_order_through_lifecycle() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());
        let order = placed_order(&f, &user);

        for status in [OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Delivered] {
            let updated = f.orders.update_status(&admin, order.id, status).unwrap();
            assert_eq!(updated.status, status);
            assert_eq!(updated.total_amount, order.total_amount);
        }
    }

    #[test]
    fn illegal_transition_is_rejected_when_enforced() {
        let f = fixture(true);
        let user = Actor::user(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());
        let order = placed_order(&f, &user);
        f.orders
            .update_status(&admin, order.id, OrderStatus::Cancelled)
            .unwrap();

        let err = f
            .orders
            .update_status(&admin, order.id, OrderStatus::Pending)
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(
            f.orders.get_order(&user, order.id).unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn any_transition_allowed_when_not_enforced() {
        let f = fixture(false);
        let user = Actor::user(Uuid::new_v4());
        let admin = Actor::admin(Uuid::new_v4());
        let order = placed_order(&f, &user);
        f.orders
            .update_status(&admin, order.id, OrderStatus::Delivered)
            .unwrap();

        let updated = f
            .orders
            .update_status(&admin, order.id, OrderStatus::Pending)
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Pending);
    }

    #[test]
    fn update_status_of_unknown_order_is_not_found() {
        let f = fixture(true);
        let err = f
            .orders
            .update_status(&Actor::admin(Uuid::new_v4()), Uuid::new_v4(), OrderStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[test]
    fn list_all_requires_admin_and_filters_by_status() {
        let f = fixture(true);
        let admin = Actor::admin(Uuid::new_v4());
        let user = Actor::user(Uuid::new_v4());
        let paid = placed_order(&f, &user);
        placed_order(&f, &user);
        placed_order(&f, &user);
        f.orders
            .update_status(&admin, paid.id, OrderStatus::Paid)
            .unwrap();

        assert!(matches!(
            f.orders.list_all(&user, 1, 20, None),
            Err(DomainError::Forbidden)
        ));

        let all = f.orders.list_all(&admin, 1, 2, None).unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items.len(), 2);

        let only_paid = f
            .orders
            .list_all(&admin, 0, 500, Some(OrderStatus::Paid))
            .unwrap();
        assert_eq!(only_paid.total, 1);
        assert_eq!(only_paid.items[0].id, paid.id);
    }

    #[test]
    fn list_all_pages_through_orders() {
        let f = fixture(true);
        let admin = Actor::admin(Uuid::new_v4());
        let user = Actor::user(Uuid::new_v4());
        for _ in 0..3 {
            placed_order(&f, &user);
        }

        let second = f.orders.list_all(&admin, 2, 2, None).unwrap();
        assert_eq!(second.total, 3);
        assert_eq!(second.items.len(), 1);

        let beyond = f.orders.list_all(&admin, 40, 2, None).unwrap();
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn list_all_rejects_page_past_the_addressable_range() {
        let f = fixture(true);
        let admin = Actor::admin(Uuid::new_v4());
        placed_order(&f, &Actor::user(Uuid::new_v4()));

        let err = f.orders.list_all(&admin, i64::MAX, 100, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
