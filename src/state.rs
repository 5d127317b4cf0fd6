use crate::application::cart_service::CartService;
use crate::application::order_service::OrderService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::catalog_repo::DieselCatalog;
use crate::infrastructure::order_repo::DieselOrderRepository;

pub type AppCartService = CartService<DieselCatalog, DieselCartRepository>;
pub type AppOrderService = OrderService<DieselOrderRepository>;

/// Services shared by every worker. All mutable state lives in the database.
pub struct AppState {
    pub cart: AppCartService,
    pub orders: AppOrderService,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            cart: CartService::new(
                DieselCatalog::new(pool.clone()),
                DieselCartRepository::new(pool.clone()),
            ),
            orders: OrderService::new(
                DieselOrderRepository::new(pool),
                config.enforce_status_transitions,
            ),
        }
    }
}
