//! Crop Climate Risk Advisory Service
//!
//! Turns a 5-day weather forecast into agricultural risk warnings and
//! advisories for a given crop and growth stage.
//!
//! ⚠️ DISCLAIMER:
//! Advisories are rule-based and forecast-driven. They do not replace local
//! agronomic expertise.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod advisory;
mod aggregation;
mod assessment;
mod config;
mod error;
mod handlers;
mod models;
mod risk;
mod state;
mod thresholds;
mod validation;
mod weather;

use crate::config::Settings;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cropwatch=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().context("Failed to load configuration")?;
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting cropwatch backend");
    info!(thresholds = ?settings.thresholds, "Loaded base thresholds");

    let app_state = web::Data::new(
        AppState::from_settings(&settings).context("Failed to initialize application state")?,
    );
    if !app_state.weather_configured() {
        warn!("OPENWEATHERMAP_API_KEY not set; /api/advisory will be unavailable");
    }

    info!("Binding server to {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await?;

    Ok(())
}
