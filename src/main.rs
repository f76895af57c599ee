use std::sync::Arc;

use clap::Parser;
use codebin::{
    config::Config,
    logger,
    model::{AppState, Database},
    routes, templates,
};
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    logger::init(config.log_level)?;

    info!("Starting codebin server at {}", config.address);

    let database = Database::open(&config.database)?;
    let templates = templates::load(&config.templates)?;
    let state = Arc::new(AppState::new(database, templates));

    let app = routes::router(state, &config.public);

    axum::Server::bind(&config.address)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
