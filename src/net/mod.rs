//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! BIND_ADDRESS + port
//!     → listener.rs (synchronous bind, bound address reported)
//!     → tls.rs (provisioned PEM pair → rustls config)
//!     → Hand off to HTTP layer (axum-server)
//! ```
//!
//! # Design Decisions
//! - TLS is mandatory; there is no plaintext listener
//! - Certificate files are read once, before serving starts

pub mod listener;
pub mod tls;

pub use listener::{Listener, ListenerError};
pub use tls::load_tls_config;
