use std::{io, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod credentials;
mod db;
mod error;
mod models;
mod routes;
mod session;
mod state;
mod user_handlers;
mod venue_handlers;

use config::Config;
use db::{load_seed_users, load_venues, SqliteStore};
use state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load().map_err(io::Error::other)?;

    let store = Arc::new(
        SqliteStore::connect(&config.database_url)
            .await
            .map_err(io::Error::other)?,
    );
    let seeds = load_seed_users(&config.users_file).map_err(io::Error::other)?;
    store
        .seed(seeds, config.mode, config.bcrypt_cost)
        .await
        .map_err(io::Error::other)?;
    let venues = load_venues(&config.venues_file).map_err(io::Error::other)?;

    let state = web::Data::new(AppState::new(&config, store, venues));
    let addr = format!("0.0.0.0:{}", config.port);

    info!(%addr, mode = %config.mode, "listening");

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors())
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(addr)?
    .run()
    .await
}
