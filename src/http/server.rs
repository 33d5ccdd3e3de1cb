//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the initservices handler on every path
//! - Wire up request tracing
//! - Serve TLS on an already bound listener until the handle shuts it down

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::Uri,
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tower_http::trace::TraceLayer;

use crate::config::ResolvedPaths;
use crate::http::body::load_body;
use crate::http::headers::load_headers;
use crate::http::response::{build_response, unix_millis};
use crate::net::Listener;

/// Files the responder serves from, read on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderConfig {
    pub body: PathBuf,
    pub headers_dir: PathBuf,
}

impl From<&ResolvedPaths> for ResponderConfig {
    fn from(paths: &ResolvedPaths) -> Self {
        Self {
            body: paths.body.clone(),
            headers_dir: paths.headers_dir.clone(),
        }
    }
}

/// HTTPS server for the initservices endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(responder: ResponderConfig) -> Self {
        Self {
            router: Self::build_router(Arc::new(responder)),
        }
    }

    fn build_router(state: Arc<ResponderConfig>) -> Router {
        Router::new()
            .route("/", any(serve_initservices))
            .route("/{*path}", any(serve_initservices))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve TLS on `listener` until `handle` is shut down.
    pub async fn run(
        self,
        listener: Listener,
        tls: RustlsConfig,
        handle: Handle,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %listener.local_addr(), "Serving LG TV SDP initservices...");

        axum_server::from_tcp_rustls(listener.into_std(), tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_initservices(State(responder): State<Arc<ResponderConfig>>, uri: Uri) -> Response {
    let headers = load_headers(&responder.headers_dir).await;
    let body = load_body(&responder.body).await;
    let response = build_response(headers, body, unix_millis());

    tracing::info!("Served request for {}", uri.path());
    response
}
