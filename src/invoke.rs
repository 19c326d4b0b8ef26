//! Platform invocation entry point.
//!
//! # Data Flow
//! ```text
//! native event
//!     → adapter.decode            (InvocationError::Decode)
//!     → LazyFacade::get           (InvocationError::Init, cold start only)
//!     → DispatchFacade::service   (InvocationError::Dispatch)
//!     → CanonicalResponse::seal
//!     → adapter.encode            (InvocationError::Encode)
//!     → native reply
//! ```
//!
//! # Design Decisions
//! - One invoker per platform; several may share the same `LazyFacade`
//! - Failures are logged once here (dispatch failures already were, by the facade)
//! - Every invocation is counted, failures under their `InvocationError::status()`
//! - No retries: the host platform owns redelivery

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use crate::error::InvocationError;
use crate::lifecycle::LazyFacade;
use crate::observability::metrics;
use crate::platform::{ApiGatewayAdapter, PlatformAdapter};

pub struct Invoker<A: PlatformAdapter> {
    adapter: A,
    facade: Arc<LazyFacade>,
}

impl<A: PlatformAdapter> Invoker<A> {
    pub fn new(adapter: A, facade: Arc<LazyFacade>) -> Self {
        Self { adapter, facade }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Handle one native event end to end.
    pub fn invoke(&self, event: A::Event) -> Result<A::Reply, InvocationError> {
        let start = Instant::now();
        let result = self.run(event, start);

        // Before the facade exists its setting is unknown, so count anyway.
        let enabled = self
            .facade
            .current()
            .map_or(true, |facade| facade.metrics_enabled());
        if enabled {
            let status = match &result {
                Ok((_, status)) => *status,
                Err(error) => error.status(),
            };
            metrics::record_invocation(A::PLATFORM, status.as_u16(), start);
        }
        result.map(|(reply, _)| reply)
    }

    fn run(
        &self,
        event: A::Event,
        start: Instant,
    ) -> Result<(A::Reply, StatusCode), InvocationError> {
        let mut request = self.adapter.decode(event).map_err(|error| {
            tracing::warn!(platform = A::PLATFORM, error = %error, "Rejected platform event");
            InvocationError::Decode(error)
        })?;

        let facade = self.facade.get()?;
        let mut response = facade.new_response();
        facade.service(&mut request, &mut response)?;

        let sealed = response.seal();
        let status = sealed.status();
        let reply = self.adapter.encode(sealed).map_err(|error| {
            tracing::error!(
                platform = A::PLATFORM,
                request_id = %request.request_id(),
                error = %error,
                "Failed encoding platform reply"
            );
            InvocationError::Encode(error)
        })?;

        tracing::info!(
            platform = A::PLATFORM,
            request_id = %request.request_id(),
            method = %request.method(),
            path = request.path(),
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Invocation complete"
        );
        Ok((reply, status))
    }
}

impl Invoker<ApiGatewayAdapter> {
    /// Stream-style handler: raw event JSON in, raw reply JSON out.
    pub fn invoke_json(&self, input: &[u8]) -> Result<Vec<u8>, InvocationError> {
        let event = serde_json::from_slice(input)
            .map_err(|e| InvocationError::Decode(e.into()))?;
        let reply = self.invoke(event)?;
        serde_json::to_vec(&reply).map_err(|e| InvocationError::Encode(e.into()))
    }
}
