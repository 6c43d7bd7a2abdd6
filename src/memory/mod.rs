//! In-process capability implementations.
//!
//! Members come from the config file, sessions live in memory and vanish on
//! restart. The desktop is headless and there is no capture pipeline.

pub mod desktop;
pub mod members;
pub mod sessions;

pub use desktop::{HeadlessDesktop, NoCapture};
pub use members::MemoryMembers;
pub use sessions::{MemorySession, MemorySessions};
