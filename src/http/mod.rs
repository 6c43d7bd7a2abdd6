//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (layers: request ID, trace, timeout, metrics)
//!     → composed route tree (gate, handlers)
//!     → request.rs (decode body, query, path params)
//!     → error.rs (classified failures rendered as JSON)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod server;

pub use error::{BoxError, HttpError};
pub use request::X_REQUEST_ID;
pub use server::{ApiServer, ServerError};
