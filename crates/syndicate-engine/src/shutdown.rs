//! Termination signal handling.
//!
//! SIGINT and SIGTERM both request a graceful stop. A second signal is
//! not special: tasks are already winding down.

use std::sync::Arc;

use syndicate_core::StopSignal;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::EngineError;

/// Install handlers and spawn a task that requests a stop on the first
/// interrupt or terminate signal.
///
/// The task also exits quietly if the stop is requested elsewhere.
pub fn spawn_signal_listener(stop: Arc<StopSignal>) -> Result<JoinHandle<()>, EngineError> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .map_err(|source| EngineError::Signal { source })?;

    Ok(tokio::spawn(async move {
        #[cfg(unix)]
        let terminated = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    info!("Interrupt received, shutting down");
                    stop.request_stop();
                }
            }
            () = terminated => {
                info!("Terminate received, shutting down");
                stop.request_stop();
            }
            () = stop.stopped() => {}
        }
    }))
}
