//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! DispatchFacade::service(req, resp)
//!     → FilterChain::new(filters, dispatcher)   (fresh per invocation)
//!     → chain.run → filters → Dispatcher::handle
//!         → RouterDispatcher: http::Request → axum Router → buffered http::Response
//!     → ChainOutcome, or InvocationError::Dispatch (logged once)
//! ```

pub mod engine;
pub mod facade;
pub mod router;

pub use engine::{dispatcher_fn, Dispatcher, FnDispatcher};
pub use facade::DispatchFacade;
pub use router::RouterDispatcher;
