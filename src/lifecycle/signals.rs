//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Resolve once either arrives so the server can drain
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handler registration failure is reported, not panicked on

/// Wait for SIGTERM or SIGINT (Ctrl+C elsewhere) and return its name.
pub async fn shutdown_signal() -> Result<&'static str, std::io::Error> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        let mut interrupt = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = terminate.recv() => Ok("SIGTERM"),
            _ = interrupt.recv() => Ok("SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("Ctrl+C")
    }
}
