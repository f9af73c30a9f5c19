//! Single binary web server exposing the bracket API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT; log level with RUST_LOG.

use actix_web::{App, HttpServer};
use sportfest_brackets::{web, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = web::new_state();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(web::configure)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}
