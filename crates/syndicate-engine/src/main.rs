//! Syndicate engine binary.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Read the configuration path from the command line
//! 3. Load and validate the configuration
//! 4. Install signal handlers
//! 5. Launch gangs, members, and police
//! 6. Monitor until a termination limit or signal
//! 7. Log the result

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use syndicate_core::{SimulationConfig, StopSignal};
use syndicate_engine::shutdown::spawn_signal_listener;
use syndicate_engine::{EngineError, Simulation, log_simulation_end};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: syndicate-engine <config_file>");
        return ExitCode::FAILURE;
    };

    match run(path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "syndicate-engine failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: PathBuf) -> Result<(), EngineError> {
    info!(path = %path.display(), "syndicate-engine starting");

    let config = SimulationConfig::from_file(&path)?;
    info!(
        min_gangs = config.min_gangs,
        max_gangs = config.max_gangs,
        min_members = config.min_members_per_gang,
        max_members = config.max_members_per_gang,
        ranks = config.gang.num_ranks,
        seed = ?config.seed,
        "Configuration loaded"
    );

    let stop = Arc::new(StopSignal::new());
    let listener = spawn_signal_listener(Arc::clone(&stop))?;

    let simulation = Simulation::launch(config, Arc::clone(&stop))?;
    let result = simulation.run().await;
    log_simulation_end(&result);

    stop.request_stop();
    if let Err(e) = listener.await {
        error!(error = %e, "Signal listener failed");
    }
    Ok(())
}
