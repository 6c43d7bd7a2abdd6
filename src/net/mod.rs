//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → plain: axum::serve on a tokio TcpListener
//!     → TLS:   tls.rs (PEM material checked up front) → axum-server rustls acceptor
//!     → Hand off to the HTTP layer
//! ```

pub mod tls;
