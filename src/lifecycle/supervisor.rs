//! Running the responder in the foreground or under a service manager.
//!
//! # Responsibilities
//! - Bind the listener and report readiness exactly once
//! - Serve until SIGTERM/SIGINT, then drain in-flight requests
//!
//! # Data Flow
//! ```text
//! run_managed:
//!     prepare (identity, blocking pool) → spawn listener task ──bind──→ oneshot Ok(addr) | Err(bind)
//!     supervisor awaits oneshot → awaits shutdown signal | task exit
//!     signal → graceful_shutdown(grace) → await task
//! ```
//!
//! # Design Decisions
//! - The readiness sender is consumed by value; a second report cannot compile
//! - After reporting a bind failure the listener task ends quietly; the
//!   supervisor returns the error

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::http::{HttpServer, ResponderConfig};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::startup::{certificate_material, prepare};
use crate::net::{load_tls_config, Listener, ListenerError};

/// How long in-flight requests may run after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Bind outcome handed from the listener task to its supervisor.
pub type Readiness = Result<SocketAddr, ListenerError>;

/// Errors raised while bringing up or running the server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Could not load TLS certificate: {0}")]
    Tls(#[source] std::io::Error),

    #[error("Server error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Could not install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("Listener stopped before reporting readiness")]
    ListenerGone,

    #[error("Listener task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Where to listen, and who to tell once listening.
#[derive(Debug)]
pub struct RunConfiguration {
    pub bind_address: IpAddr,
    pub port: u16,
    ready: Option<oneshot::Sender<Readiness>>,
}

impl RunConfiguration {
    /// No readiness report; bind errors are returned directly.
    pub fn foreground(bind_address: IpAddr, port: u16) -> Self {
        Self {
            bind_address,
            port,
            ready: None,
        }
    }

    /// Readiness is reported over the returned receiver.
    pub fn managed(bind_address: IpAddr, port: u16) -> (Self, oneshot::Receiver<Readiness>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                bind_address,
                port,
                ready: Some(tx),
            },
            rx,
        )
    }
}

/// Bind, report readiness if asked to, and serve until `handle` shuts down.
pub async fn serve(
    run: RunConfiguration,
    server: HttpServer,
    tls: RustlsConfig,
    handle: Handle,
) -> Result<(), ServeError> {
    let bound = Listener::bind(run.bind_address, run.port);

    match (bound, run.ready) {
        (Ok(listener), ready) => {
            if let Some(tx) = ready {
                // A dropped receiver means nobody is waiting; keep serving.
                let _ = tx.send(Ok(listener.local_addr()));
            }
            server
                .run(listener, tls, handle)
                .await
                .map_err(ServeError::Io)
        }
        (Err(e), Some(tx)) => match tx.send(Err(e)) {
            Ok(()) => Ok(()),
            Err(Err(e)) => Err(e.into()),
            Err(Ok(_)) => Ok(()),
        },
        (Err(e), None) => Err(e.into()),
    }
}

/// Serve in the current task until a shutdown signal.
pub async fn run_foreground(config: &AppConfig, bind_address: IpAddr) -> Result<(), AppError> {
    let (server, tls) = bring_up(config).await?;
    let handle = Handle::new();
    let run = RunConfiguration::foreground(bind_address, config.listener.port);

    until_shutdown(serve(run, server, tls, handle.clone()), handle).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Serve as a managed service: spawn the listener, wait for it to bind, then
/// wait for a shutdown signal.
pub async fn run_managed(config: &AppConfig, bind_address: IpAddr) -> Result<(), AppError> {
    let (server, tls) = bring_up(config).await?;
    let handle = Handle::new();
    let (run, ready) = RunConfiguration::managed(bind_address, config.listener.port);

    let task = tokio::spawn(serve(run, server, tls, handle.clone()));
    supervise(task, ready, handle).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Await the readiness report from `task`, then keep it running until a
/// shutdown signal or its own exit.
pub async fn supervise(
    task: tokio::task::JoinHandle<Result<(), ServeError>>,
    ready: oneshot::Receiver<Readiness>,
    handle: Handle,
) -> Result<(), ServeError> {
    let report = ready.await;
    match report {
        Ok(Ok(addr)) => tracing::info!(address = %addr, "Service started"),
        Ok(Err(e)) => {
            // The task ends on its own after reporting.
            task.await??;
            return Err(e.into());
        }
        Err(_) => {
            task.await??;
            return Err(ServeError::ListenerGone);
        }
    }

    until_shutdown(async move { task.await? }, handle).await
}

async fn until_shutdown<F>(serving: F, handle: Handle) -> Result<(), ServeError>
where
    F: Future<Output = Result<(), ServeError>>,
{
    tokio::pin!(serving);

    tokio::select! {
        result = &mut serving => result,
        signal = shutdown_signal() => {
            let signal = signal.map_err(ServeError::Signal)?;
            tracing::info!(signal, "Shutdown signal received, draining");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
            serving.await
        }
    }
}

async fn bring_up(config: &AppConfig) -> Result<(HttpServer, RustlsConfig), AppError> {
    // Key generation is CPU-bound.
    let owned = config.clone();
    let paths = tokio::task::spawn_blocking(move || prepare(&owned))
        .await
        .map_err(ServeError::from)??;
    let tls = load_tls_config(&certificate_material(&paths))
        .await
        .map_err(ServeError::Tls)?;
    Ok((HttpServer::new(ResponderConfig::from(&paths)), tls))
}
