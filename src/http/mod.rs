//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (axum-server)
//!     → server.rs (Axum router, TraceLayer, one handler for every path)
//!     → headers.rs (header directory → HeaderMap)
//!     → body.rs (JSON body file → bytes)
//!     → response.rs (X-Server-Time, default content type)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Header and body files are read per request; no caching
//! - File problems degrade the response, they never fail the request

pub mod body;
pub mod headers;
pub mod response;
pub mod server;

pub use server::{HttpServer, ResponderConfig};
