pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use auth::TokenSigner;
pub use config::AppConfig;
pub use db::{create_pool, DbPool};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migrations", applied.len());
    Ok(())
}

/// Build and return an actix-web `Server` bound to `config.host:config.port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: &AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let state = web::Data::new(AppState::new(pool, config));
    let signer = web::Data::new(TokenSigner::new(&config.token_secret));
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(signer.clone())
            .wrap(Logger::default())
            .route("/health", web::get().to(handlers::health::health))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/cart")
                            .route("", web::get().to(handlers::cart::get_cart))
                            .route("/items", web::post().to(handlers::cart::add_item))
                            .route("/items/{id}", web::put().to(handlers::cart::update_item))
                            .route("/items/{id}", web::delete().to(handlers::cart::remove_item))
                            .route("/clear", web::delete().to(handlers::cart::clear_cart)),
                    )
                    .service(
                        web::scope("/orders")
                            .route("", web::get().to(handlers::orders::list_orders))
                            .route("/checkout", web::post().to(handlers::orders::checkout))
                            .route("/{id}", web::get().to(handlers::orders::get_order))
                            .route(
                                "/{id}/status",
                                web::put().to(handlers::orders::update_order_status),
                            ),
                    )
                    .service(
                        web::scope("/admin")
                            .route("/orders", web::get().to(handlers::admin::list_all_orders)),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
