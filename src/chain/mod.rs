//! Filter-chain emulation.
//!
//! # Data Flow
//! ```text
//! FilterChain::run(req, resp)
//!     → filter[0].process(req, resp, next)
//!         → next.run → filter[1].process ...
//!             → next.run → DispatchFilter (dispatch engine, never continues)
//!     → ChainOutcome { filters_entered, dispatched }
//! ```
//!
//! # Design Decisions
//! - One chain per invocation, run exactly once
//! - Order is the registration order frozen at facade construction
//! - Not calling `next` is a short-circuit, not an error

pub mod builtin;
pub mod emulator;
pub mod filter;

pub use builtin::{DenyPathFilter, RequestId, RequestIdFilter, RequireHeaderFilter, ResponseHeaderFilter};
pub use emulator::{ChainOutcome, FilterChain};
pub use filter::{filter_fn, Filter, FnFilter, Next};
