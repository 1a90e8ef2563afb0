mod app;
mod collision;
mod config;
mod constants;
mod controller;
mod error;
mod graphics;
mod hud;
mod integrator;
mod logging;
mod math;
mod state;

use clap::Parser;
use config::Config;
use error::AppError;

/// Main function
fn main() -> Result<(), AppError> {
    let config = Config::parse();
    config.validate()?;
    logging::init_logging(config.log_file.as_deref())?;

    tracing::info!(?config, "starting");

    match config.headless {
        Some(ticks) => app::run_headless(&config, ticks, &mut std::io::stdout().lock()),
        None => app::run(&config),
    }
}
