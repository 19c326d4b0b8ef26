//! Process-lifetime dispatch entry point.
//!
//! # Responsibilities
//! - Hold the frozen filter list and the dispatch engine
//! - Build one fresh [`FilterChain`] per invocation and run it
//! - Catch, log and record any failure exactly once
//!
//! # Design Decisions
//! - No per-invocation state on the facade: concurrent `service` calls share only
//!   immutable data (reentrancy of the engine itself is the engine's contract)
//! - Errors are returned, never swallowed; the platform layer decides how to report them

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::chain::{ChainOutcome, Filter, FilterChain};
use crate::dispatch::engine::Dispatcher;
use crate::error::{DispatchError, InvocationError};
use crate::model::{CanonicalRequest, CanonicalResponse, Charset};
use crate::observability::metrics;

#[derive(Clone)]
pub struct DispatchFacade {
    filters: Arc<[Arc<dyn Filter>]>,
    dispatcher: Arc<dyn Dispatcher>,
    default_charset: Charset,
    metrics_enabled: bool,
}

impl DispatchFacade {
    pub fn new(filters: Vec<Arc<dyn Filter>>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            filters: filters.into(),
            dispatcher,
            default_charset: Charset::Utf8,
            metrics_enabled: true,
        }
    }

    pub fn with_default_charset(mut self, charset: Charset) -> Self {
        self.default_charset = charset;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }

    /// Names of the registered filters, in execution order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// A response pre-configured with this facade's default charset.
    pub fn new_response(&self) -> CanonicalResponse {
        CanonicalResponse::with_charset(self.default_charset)
    }

    /// Run one request through the filters and the dispatch engine.
    pub fn service(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<ChainOutcome, InvocationError> {
        let start = Instant::now();
        let mut chain = FilterChain::new(&self.filters, self.dispatcher.as_ref());

        match chain.run(req, resp) {
            Ok(outcome) => {
                if outcome.short_circuited() && self.metrics_enabled {
                    metrics::record_short_circuit();
                }
                tracing::debug!(
                    request_id = %req.request_id(),
                    method = %req.method(),
                    path = %req.path(),
                    dispatched = outcome.dispatched,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Request serviced"
                );
                Ok(outcome)
            }
            Err(error) => Err(self.fail(req, error)),
        }
    }

    fn fail(&self, req: &CanonicalRequest, error: DispatchError) -> InvocationError {
        tracing::error!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            error = %error,
            "Failed processing request"
        );
        if self.metrics_enabled {
            metrics::record_dispatch_failure();
        }
        InvocationError::Dispatch(error)
    }
}

impl fmt::Debug for DispatchFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchFacade")
            .field("filters", &self.filter_names())
            .field("default_charset", &self.default_charset)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{filter_fn, DenyPathFilter};
    use crate::dispatch::dispatcher_fn;
    use axum::http::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_dispatch_error_wrapped_once() {
        let facade = DispatchFacade::new(
            Vec::new(),
            Arc::new(dispatcher_fn(|_req, _resp| Err(DispatchError::engine("db down")))),
        );
        let mut req = CanonicalRequest::builder(Method::GET, "/pets").build();
        let mut resp = facade.new_response();

        let err = facade.service(&mut req, &mut resp).unwrap_err();
        match err {
            InvocationError::Dispatch(DispatchError::Engine(source)) => {
                assert_eq!(source.to_string(), "db down")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_each_service_gets_fresh_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let facade = DispatchFacade::new(
            vec![Arc::new(DenyPathFilter::new("/foo/deny", StatusCode::FORBIDDEN, "Forbidden"))],
            Arc::new(dispatcher_fn(move |_req, _resp| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })),
        );

        for _ in 0..3 {
            let mut req = CanonicalRequest::builder(Method::GET, "/pets").build();
            let mut resp = facade.new_response();
            facade.service(&mut req, &mut resp).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(facade.filter_names(), vec!["deny_path"]);
    }

    #[test]
    fn test_concurrent_invocations_do_not_interfere() {
        let facade = Arc::new(DispatchFacade::new(
            vec![Arc::new(filter_fn("tag", |req, resp, next| {
                let tag = req.parameter("n").unwrap_or_default().to_string();
                resp.add_header("X-Seen", tag)?;
                next.run(req, resp)
            }))],
            Arc::new(dispatcher_fn(|req, resp| {
                thread::yield_now();
                resp.write_str(req.parameter("n").unwrap_or_default())
            })),
        ));

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let facade = facade.clone();
                thread::spawn(move || {
                    let mut req = CanonicalRequest::builder(Method::GET, "/echo")
                        .query_param("n", n.to_string())
                        .build();
                    let mut resp = facade.new_response();
                    facade.service(&mut req, &mut resp).unwrap();
                    (n, resp)
                })
            })
            .collect();

        for handle in handles {
            let (n, resp) = handle.join().unwrap();
            assert_eq!(resp.body_text(), Some(n.to_string()));
            assert_eq!(resp.header_values("x-seen"), [n.to_string().as_str()]);
        }
    }
}
