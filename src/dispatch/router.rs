//! Axum-backed dispatch engine.
//!
//! # Responsibilities
//! - Turn a canonical request into an `http::Request` for an `axum::Router`
//! - Drive the router to completion on an owned current-thread runtime
//! - Copy status, every header value and the buffered body into the canonical response
//!
//! # Design Decisions
//! - `block_on` per request: the reply must be complete before the invocation returns
//! - Must not be called from inside an async context (Tokio panics on nested `block_on`)
//! - Body buffered with a hard limit, like the proxy's retry buffer

use axum::{
    body::Body,
    http::{Request, Uri},
    Router,
};
use tokio::runtime::{Builder, Runtime};
use tower::ServiceExt;
use url::{Position, Url};

use crate::dispatch::engine::Dispatcher;
use crate::error::{BuildError, DispatchError};
use crate::model::{CanonicalRequest, CanonicalResponse};

/// Default cap on buffered response bodies.
pub const DEFAULT_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub struct RouterDispatcher {
    router: Router,
    runtime: Runtime,
    body_limit: usize,
}

impl RouterDispatcher {
    /// Wrap a router, building the runtime that drives it.
    pub fn new(router: Router) -> Result<Self, BuildError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BuildError::Engine(e.into()))?;

        Ok(Self {
            router,
            runtime,
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    fn to_http_request(req: &CanonicalRequest) -> Result<Request<Body>, DispatchError> {
        // Url percent-encodes characters a raw Uri would reject (spaces in decoded paths).
        let mut target = Url::parse("http://localhost/").map_err(DispatchError::engine)?;
        target.set_path(req.path());
        target.set_query(req.query_string().as_deref());
        let uri: Uri = target[Position::BeforePath..]
            .parse()
            .map_err(DispatchError::engine)?;

        let mut request = Request::builder()
            .method(req.method().clone())
            .uri(uri)
            .body(Body::from(req.body().clone()))
            .map_err(DispatchError::engine)?;
        *request.headers_mut() = req.headers().clone();
        *request.extensions_mut() = req.extensions().clone();
        Ok(request)
    }
}

impl Dispatcher for RouterDispatcher {
    fn handle(
        &self,
        req: &CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<(), DispatchError> {
        let request = Self::to_http_request(req)?;
        let router = self.router.clone();
        let limit = self.body_limit;

        let (parts, body) = self.runtime.block_on(async move {
            let response = match router.oneshot(request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };
            let (parts, body) = response.into_parts();
            let bytes = axum::body::to_bytes(body, limit)
                .await
                .map_err(DispatchError::engine)?;
            Ok::<_, DispatchError>((parts, bytes))
        })?;

        tracing::debug!(
            request_id = %req.request_id(),
            status = parts.status.as_u16(),
            body_len = body.len(),
            "Router dispatch complete"
        );

        resp.set_status(parts.status);
        for (name, value) in parts.headers.iter() {
            resp.add_header(name.clone(), value.clone())?;
        }
        resp.write(&body);
        Ok(())
    }
}
