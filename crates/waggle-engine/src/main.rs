//! Survey engine binary for the Waggle agent core.
//!
//! Generates a seeded ground-truth terrain, releases a group of scouts at
//! the origin, and runs them until the reachable world is mapped or the
//! turn limit is hit. Scouts know only what they observe or receive from
//! peers they meet.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `waggle-config.yaml` (or the path given as
//!    the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Generate terrain from the survey seed
//! 4. Run the survey
//! 5. Log the report

mod error;
mod survey;
mod terrain;

use std::path::{Path, PathBuf};

use tracing::info;
use tracing_subscriber::EnvFilter;
use waggle_core::config::{LoggingConfig, WaggleConfig};

use crate::error::EngineError;
use crate::survey::Survey;
use crate::terrain::Terrain;

/// Config file read when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "waggle-config.yaml";

/// Application entry point for the survey engine.
///
/// # Errors
///
/// Returns an error if configuration, terrain generation, or the survey
/// itself fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember where the
    //    config came from and report it afterwards.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("waggle-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        grid_size = config.grid.size,
        agents = config.survey.agents,
        max_turns = config.survey.max_turns,
        seed = config.survey.seed,
        "Survey configured"
    );

    // 3. Generate terrain.
    let terrain = Terrain::generate(config.grid.size, &config.survey)?;
    info!(
        open_cells = terrain.open_cells(),
        walls = terrain.wall_cells(),
        food = terrain.total_food(),
        "Terrain generated"
    );

    // 4. Run the survey.
    let report = Survey::new(&terrain, &config.survey)?.run()?;

    // 5. Log the result.
    info!(
        turns = report.turns,
        completed = report.completed,
        scouts = report.scouts,
        moves = report.moves,
        exchanges = report.exchanges,
        known_cells = report.known_cells,
        open_cells = terrain.open_cells(),
        food_known = report.food_known,
        food_total = report.food_total,
        "Survey finished"
    );

    Ok(())
}

/// Load configuration from the command-line path or the default location.
///
/// An explicit path must exist. The default path falls back to built-in
/// defaults (with environment overrides) when absent.
fn load_config() -> Result<(WaggleConfig, Option<PathBuf>), EngineError> {
    if let Some(arg) = std::env::args_os().nth(1) {
        let path = PathBuf::from(arg);
        let config = WaggleConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = WaggleConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        let mut config = WaggleConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
