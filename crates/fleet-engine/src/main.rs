//! Fleet engine binary.
//!
//! Wires the control center, the initial fleet and the simulated customers
//! together and runs the tick loop for the configured number of ticks.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `fleet-config.yaml` (or `FLEET_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the random sources from `world.seed`
//! 4. Spawn the stations and their vehicles
//! 5. Create the control center and register every station
//! 6. Run the simulation loop with rental activity between ticks
//! 7. Log the result

mod activity;
mod error;
mod spawner;

use std::path::PathBuf;

use anyhow::Context;
use fleet_core::config::{LogFormat, LoggingConfig};
use fleet_core::runner::log_simulation_end;
use fleet_core::{ControlCenter, FleetConfig, run_simulation};
use fleet_types::IdAllocator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::activity::RentalActivity;
use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "fleet-config.yaml";

/// Environment variable overriding the configuration path.
const CONFIG_ENV: &str = "FLEET_CONFIG";

/// Application entry point for the fleet engine.
///
/// # Errors
///
/// Returns an error if configuration, spawning or the simulation fails.
fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so the source is
    //    reported right after initialization.
    let (config, source) = load_config().context("failed to load fleet configuration")?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("fleet-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        ticks = config.world.ticks,
        stations = config.fleet.station_count,
        "Simulation configured"
    );

    // 3. Seed the random sources. Each consumer gets its own stream so
    //    changing one does not shift the others.
    let mut root_rng = StdRng::seed_from_u64(config.world.seed);
    let mut spawn_rng = StdRng::from_rng(&mut root_rng);
    let supervision_rng = StdRng::from_rng(&mut root_rng);
    let activity_rng = StdRng::from_rng(&mut root_rng);

    // 4. Spawn the fleet.
    let mut ids = IdAllocator::new();
    let stations = spawner::spawn_fleet(
        &config.fleet,
        config.supervision.maintenance_threshold,
        &mut ids,
        &mut spawn_rng,
    )
    .context("failed to spawn the initial fleet")?;

    // 5. Create the control center.
    let mut center = ControlCenter::from_config(&config, supervision_rng);
    for station in &stations {
        if !center.register_station(station) {
            warn!(station = %station.borrow().id(), "Station not registered");
        }
    }
    info!(
        stations = center.stations().len(),
        vehicles = center.total_vehicles(),
        capacity = center.total_capacity(),
        "Control center ready"
    );

    // 6. Run the simulation loop.
    let mut activity = RentalActivity::new(config.activity, activity_rng);
    let result = run_simulation(&mut center, config.world.ticks, &mut activity)
        .map_err(EngineError::from)?;

    // 7. Log the result.
    log_simulation_end(&result);
    let stats = activity.stats();
    info!(
        rentals = stats.rentals,
        returns = stats.returns,
        missed_rentals = stats.missed_rentals,
        still_rented = activity.rented().len(),
        "Customer activity"
    );
    let fleet_json =
        serde_json::to_string(&result.fleet).context("failed to serialize fleet summary")?;
    info!(fleet = %fleet_json, "Final fleet summary");

    info!("fleet-engine shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Load the fleet configuration.
///
/// Reads the file named by `FLEET_CONFIG` if set (it must exist),
/// otherwise `fleet-config.yaml` in the working directory, falling back to
/// defaults when that is missing. Returns the path actually read, if any.
fn load_config() -> Result<(FleetConfig, Option<PathBuf>), EngineError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        let config_path = PathBuf::from(explicit);
        let config = FleetConfig::from_file(&config_path)?;
        return Ok((config, Some(config_path)));
    }
    let config_path = PathBuf::from(CONFIG_FILE);
    if config_path.exists() {
        let config = FleetConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((FleetConfig::default(), None))
    }
}
