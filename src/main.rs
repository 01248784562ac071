use std::io;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use ideahub::{audit, auth::token, config::AppConfig, db, handlers, state::AppServices};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }
    env_logger::init();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    // Initialize database
    let pool = db::init_pool(&config.database_url, config.max_connections)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    // Clean up old audit entries and expired tokens
    match audit::cleanup_old_entries(&pool, config.audit_retention_days).await {
        Ok(removed) => log::info!("Audit cleanup removed {removed} entries"),
        Err(e) => log::warn!("Audit cleanup failed: {e}"),
    }
    match token::purge_expired(&pool).await {
        Ok(removed) => log::info!("Removed {removed} expired API tokens"),
        Err(e) => log::warn!("Token cleanup failed: {e}"),
    }

    let bind_addr = config.bind_addr.clone();
    let services = AppServices::new(pool, config).map_err(|e| io::Error::other(e.to_string()))?;

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                HttpResponse::NotFound().json(serde_json::json!({ "message": "Route not found" }))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
