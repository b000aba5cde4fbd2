//! Simulation driver for Idle Investor.
//!
//! Deploys the currency, the credential registry, and the game exactly as
//! a production deployment would, then plays a seeded population of
//! players through a number of simulated days and logs the outcome.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `investor-config.yaml`
//! 3. Load the `simulation` section
//! 4. Deploy against a manual clock starting at the current time
//! 5. Run the scenario, auditing conservation each day
//! 6. Log the summary

mod error;
mod scenario;

use std::path::Path;

use investor_game::{Clock, Deployment, GameConfig, ManualClock, SystemClock, deploy};
use investor_types::Address;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::ScenarioConfig;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "investor-config.yaml";

/// Application entry point for the simulation driver.
///
/// # Errors
///
/// Returns an error if configuration, deployment, or the run fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("investor-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        currency = config.currency.symbol,
        decimals = config.currency.decimals,
        initial_supply = config.currency.initial_supply,
        welcome_grant = config.game.welcome_grant,
        rate_period_secs = config.game.rate_period_secs,
        "Configuration loaded"
    );

    // 3. Load the simulation section.
    let scenario_config = load_scenario_config()?;
    scenario_config.validate()?;
    info!(
        players = scenario_config.players,
        days = scenario_config.days,
        seed = scenario_config.seed,
        "Scenario configuration loaded"
    );

    // 4. Deploy.
    let clock = ManualClock::new(SystemClock.now());
    let Deployment { mut game, deployer } = deploy(&config, Address::new(), clock.clone())?;
    info!(deployer = %deployer, game = %game.address(), "Game deployed");

    // 5. Run.
    let report = scenario::run(&mut game, &clock, &scenario_config)?;

    // 6. Log results.
    scenario::log_report(&report, &game);

    info!(days = report.days, "investor-engine shutdown complete");

    Ok(())
}

/// Load the deployment configuration from `investor-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<GameConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        let config = GameConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(GameConfig::default())
    }
}

/// Load scenario configuration from `investor-config.yaml`.
///
/// Reads the `simulation` section from the YAML config file. If the file
/// does not exist or lacks the `simulation` key, defaults are used.
fn load_scenario_config() -> Result<ScenarioConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(ScenarioConfig::default());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Scenario {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value =
        serde_yml::from_str(&contents).map_err(|e| EngineError::Scenario {
            message: format!("failed to parse config YAML: {e}"),
        })?;

    raw.get("simulation").map_or_else(
        || Ok(ScenarioConfig::default()),
        |section| {
            serde_yml::from_value(section.clone()).map_err(|e| EngineError::Scenario {
                message: format!("failed to parse simulation config: {e}"),
            })
        },
    )
}
