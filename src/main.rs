use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::sync::Arc;

mod config;
mod db;
mod models;
mod repository;
mod routes;

use config::DbConfig;
use repository::{PgTaskRepository, TaskStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Any failure before the server starts is fatal; nothing is retried.
    let db_config = DbConfig::load(config::config_path()).map_err(|e| {
        error!("Failed to load database config: {}", e);
        io::Error::other(e)
    })?;
    let provisioned = db::provision(&db_config).await.map_err(|e| {
        error!("Failed to provision database: {}", e);
        io::Error::other(e)
    })?;
    if provisioned.created {
        info!("Database {} was created for this run", db_config.database);
    }

    let store: Arc<dyn TaskStore> = Arc::new(PgTaskRepository::new(provisioned.pool));
    let store = web::Data::from(store);

    let server_address = config::server_address();
    info!("Server running at http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(routes::routes::tasks_configure)
    })
    .bind(server_address)?
    .run()
    .await
}
