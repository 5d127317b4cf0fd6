use checkout_service::{build_server, create_pool, run_migrations, AppConfig};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = create_pool(&config.database_url, config.db_pool_size).map_err(|e| {
        log::error!("Failed to create database connection pool: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    log::info!(
        "Starting server at http://{}:{} (status transitions enforced: {})",
        config.host,
        config.port,
        config.enforce_status_transitions
    );

    build_server(pool, &config)?.await
}
