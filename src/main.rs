// src/main.rs

mod admin;
mod app_state;
mod auth;
mod board;
mod config;
mod error;
mod middleware;
mod models;
mod profile;
mod routes;
mod store;
mod tasks;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use crate::app_state::AppState;
use crate::config::{Config, StorageBackend};
use crate::store::{MemoryStore, MongoStore};

async fn build_state(config: Config) -> Result<AppState, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Mongo => {
            let uri = config.mongo_uri.clone().unwrap_or_default();
            let store = MongoStore::init(&uri, &config.database_name).await?;
            Ok(AppState::with_store(Arc::new(store), config))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Ok(AppState::with_store(Arc::new(MemoryStore::new()), config))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    let state = match build_state(config.clone()).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialise storage: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let bind_addr = (config.host.clone(), config.port);
    info!("Server running at http://{}:{}", bind_addr.0, bind_addr.1);
    info!("Allowed CORS origins: {}", config.allowed_origins.join(", "));

    HttpServer::new(move || {
        let cors = config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
                http::header::AUTHORIZATION,
            ])
            .supports_credentials()
            .max_age(3600);
        let secret = config.jwt_secret.clone();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| routes::configure(cfg, &secret))
    })
    .bind(bind_addr)?
    .run()
    .await
}
