//! initservices responder library.
//!
//! TLS identity bootstrap, service-lifecycle orchestration and the HTTPS
//! responder, wired together by the binary in `main.rs`.

// Core subsystems
pub mod config;
pub mod http;
pub mod identity;
pub mod net;
pub mod service;

// Cross-cutting concerns
pub mod cli;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use error::AppError;
pub use http::HttpServer;
