mod config;
mod error;
mod reference;
mod services;
mod state;
mod store;
mod submission;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::Store;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::fs;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();
    let state = AppState::new(config).map_err(|e| {
        error!("{e}");
        io::Error::other(e.to_string())
    })?;

    Store::open(&state.config.database_path)
        .and_then(|store| store.migrate())
        .map_err(|e| {
            error!("Database setup failed: {e}");
            io::Error::other(e.to_string())
        })?;
    fs::create_dir_all(&state.config.media_dir)?;

    let bind = (state.config.host.clone(), state.config.port);
    info!("Server running at http://{}:{}", bind.0, bind.1);

    let data = web::Data::new(state);
    HttpServer::new(move || {
        let media_base_path = data.config.media_base_path.clone();
        let media_dir = data.config.media_dir.clone();
        App::new()
            .app_data(data.clone())
            .configure(|cfg| services::configure(cfg, &media_base_path, &media_dir))
    })
    .bind(bind)?
    .run()
    .await
}
