//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route builders (composition root, sub-trees, extensions)
//!     → router.rs (Router capability: verbs, with, group, route)
//!     → tree.rs (scopes snapshot prefix + middleware chain)
//!     → RouteTree (validated, immutable)
//!     → into_axum() (one MethodRouter per pattern)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Middleware scoped to the group it was attached in, never to siblings
//! - Duplicate (method, pattern) bindings fail the build
//! - Deterministic: same builders always produce the same tree

pub mod router;
pub mod tree;

pub use router::{handler, middleware, Handler, HandlerResult, Middleware, RouteBuilder, Router};
pub use tree::{RouteEntry, RouteError, RouteTree};
