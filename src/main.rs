//Third-party-dependencies
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use scoreboard_service::routes::{points_routes, team_routes, watch_routes};
use scoreboard_service::services::watch::WatchRegistry;
use scoreboard_service::utils::store::TeamStore;
use scoreboard_service::utils::Auth;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let address = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:9090".to_string());
    let storage_dir = env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string());

    let store = TeamStore::new(&storage_dir);
    store
        .init()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let registry = WatchRegistry::new();

    info!("Server starting at {} (storage: {})", address, storage_dir);

    let store_data = web::Data::new(store);
    let registry_data = web::Data::new(registry);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Auth)
            .app_data(store_data.clone())
            .app_data(registry_data.clone())
            .configure(team_routes::init_routes)
            .configure(points_routes::init_routes)
            .configure(watch_routes::init_routes)
    })
    .bind(address)?
    .run()
    .await
}
