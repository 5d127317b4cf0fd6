use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{self, CartLine, PricedCartLine};
use crate::domain::catalog::Product;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderItem, OrderPage, OrderStatus, ShippingAddress};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, order_items, orders, products};

use super::models::{CartItemRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductRow};

fn to_order(row: OrderRow, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|_| DomainError::Internal(format!("order {} has unknown status '{}'", row.id, row.status)))?;
    let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
        .map_err(|e| DomainError::Internal(format!("order {} has unreadable address: {}", row.id, e)))?;

    Ok(Order {
        id: row.id,
        order_number: row.order_number,
        user_id: row.user_id,
        status,
        total_amount: row.total_amount,
        shipping_address,
        payment_id: row.payment_id,
        created_at: row.created_at,
        updated_at: row.updated_at,
        items: items
            .into_iter()
            .map(|i| OrderItem {
                id: i.id,
                order_id: i.order_id,
                product_id: i.product_id,
                variant_id: i.variant_id,
                quantity: i.quantity,
                price_at_purchase: i.price_at_purchase,
            })
            .collect(),
    })
}

/// Load the items of every order in `rows` in one query and assemble the
/// domain orders, keeping the order of `rows`.
fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .load(conn)?;
    let grouped = items.grouped_by(&rows);
    rows.into_iter()
        .zip(grouped)
        .map(|(row, items)| to_order(row, items))
        .collect()
}

fn with_items_one(conn: &mut PgConnection, row: OrderRow) -> Result<Order, DomainError> {
    let mut orders = with_items(conn, vec![row])?;
    orders
        .pop()
        .ok_or_else(|| DomainError::Internal("order vanished while loading items".to_string()))
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn place<F>(&self, user_id: Uuid, build: F) -> Result<Order, DomainError>
    where
        F: FnOnce(&[PricedCartLine]) -> Result<NewOrder, DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Lock the cart. A concurrent checkout for the same user waits
            //    here and then sees the lines already deleted.
            let lines: Vec<CartLine> = cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .order(cart_items::created_at.asc())
                .select(CartItemRow::as_select())
                .for_update()
                .load(conn)?
                .into_iter()
                .map(CartLine::from)
                .collect();
            let line_ids: Vec<Uuid> = lines.iter().map(|l| l.id).collect();

            // 2. Read prices exactly once; the same values feed the total and
            //    the item snapshots.
            let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
            let catalog: Vec<Product> = products::table
                .filter(products::id.eq_any(product_ids))
                .select(ProductRow::as_select())
                .load(conn)?
                .into_iter()
                .map(Product::from)
                .collect();
            let priced = cart::price_lines(lines, &catalog);

            let new_order = build(&priced)?;
            let shipping_address = serde_json::to_value(&new_order.shipping_address)
                .map_err(|e| DomainError::Internal(e.to_string()))?;

            // 3. Insert the order
            let order_row = diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: new_order.id,
                    order_number: new_order.order_number.clone(),
                    user_id: new_order.user_id,
                    status: new_order.status.as_str().to_string(),
                    total_amount: new_order.total_amount.clone(),
                    shipping_address,
                })
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            // 4. Insert the price-snapshotted items
            let new_items: Vec<NewOrderItemRow> = new_order
                .items
                .into_iter()
                .map(|i| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id: new_order.id,
                    product_id: i.product_id,
                    variant_id: i.variant_id,
                    quantity: i.quantity,
                    price_at_purchase: i.price_at_purchase,
                })
                .collect();
            let item_rows = diesel::insert_into(order_items::table)
                .values(&new_items)
                .returning(OrderItemRow::as_returning())
                .get_results(conn)?;

            // 5. Empty the cart. Only the locked lines are removed; a line
            //    added after the lock was taken stays for the next checkout.
            diesel::delete(cart_items::table.filter(cart_items::id.eq_any(line_ids)))
                .execute(conn)?;

            to_order(order_row, item_rows)
        })
    }

    fn find_for_user(&self, order_id: Uuid, user_id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        with_items_one(&mut conn, order).map(Some)
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .order((orders::created_at.desc(), orders::id.desc()))
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        with_items(&mut conn, rows)
    }

    fn change_status<F>(&self, order_id: Uuid, decide: F) -> Result<Option<Order>, DomainError>
    where
        F: FnOnce(OrderStatus) -> Result<OrderStatus, DomainError>,
    {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let order = orders::table
                .filter(orders::id.eq(order_id))
                .select(OrderRow::as_select())
                .for_update()
                .first(conn)
                .optional()?;

            let Some(order) = order else {
                return Ok(None);
            };

            let current = order.status.parse::<OrderStatus>().map_err(|_| {
                DomainError::Internal(format!("order {} has unknown status '{}'", order.id, order.status))
            })?;
            let next = decide(current)?;

            let updated = diesel::update(orders::table.filter(orders::id.eq(order_id)))
                .set((
                    orders::status.eq(next.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderRow::as_returning())
                .get_result(conn)?;

            with_items_one(conn, updated).map(Some)
        })
    }

    fn list(
        &self,
        offset: i64,
        limit: i64,
        status: Option<OrderStatus>,
    ) -> Result<OrderPage, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count_query = orders::table.into_boxed();
            let mut page_query = orders::table.into_boxed();
            if let Some(status) = status {
                count_query = count_query.filter(orders::status.eq(status.as_str()));
                page_query = page_query.filter(orders::status.eq(status.as_str()));
            }

            let total: i64 = count_query.count().get_result(conn)?;

            let rows = page_query
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.desc()))
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            Ok(OrderPage {
                items: with_items(conn, rows)?,
                total,
            })
        })
    }
}
