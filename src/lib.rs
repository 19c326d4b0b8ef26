//! Serverless web proxy library.
//!
//! Adapts FaaS platform events into canonical HTTP requests, runs them through an ordered
//! filter chain and a dispatch engine, and adapts the response back into the platform's
//! native reply.

pub mod chain;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod invoke;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod platform;

pub use chain::{filter_fn, Filter, FilterChain, Next};
pub use config::schema::ProxyConfig;
pub use dispatch::{dispatcher_fn, DispatchFacade, Dispatcher, RouterDispatcher};
pub use error::{AdapterError, BuildError, DispatchError, InvocationError};
pub use invoke::Invoker;
pub use lifecycle::{LazyFacade, ProxyBuilder};
pub use model::{CanonicalRequest, CanonicalResponse, SealedResponse};
pub use platform::{ApiGatewayAdapter, PlatformAdapter, RequestObjectAdapter};
