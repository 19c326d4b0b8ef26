//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cold start (once.rs):
//!     first invocation → lock → re-check → build → publish
//!     concurrent first invocations wait on the lock, then read the published facade
//!
//! Assembly (startup.rs):
//!     ProxyConfig → validate → declared filters + programmatic filters
//!         + dispatch engine → DispatchFacade
//! ```
//!
//! # Design Decisions
//! - Nothing is built at load time; the host may load the crate long before traffic
//! - Construction failure is retried on the next invocation, never cached
//! - Once built, the facade is immutable for the life of the process

pub mod once;
pub mod startup;

pub use once::{LazyFacade, LazyOnce};
pub use startup::{build_filter, ProxyBuilder};
