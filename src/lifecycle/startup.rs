//! Facade assembly.
//!
//! # Responsibilities
//! - Validate configuration
//! - Turn declared filters into filter instances, in declaration order
//! - Append programmatically registered filters after the declared ones
//! - Wrap the dispatch engine and freeze everything into a [`DispatchFacade`]
//!
//! # Design Decisions
//! - Fail fast: any invalid declaration aborts the whole build
//! - The builder runs inside the lazy-once slot, so it runs on the first invocation

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::Router;

use crate::chain::{DenyPathFilter, Filter, RequestIdFilter, RequireHeaderFilter, ResponseHeaderFilter};
use crate::config::loader::ConfigError;
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{FilterConfig, ProxyConfig};
use crate::dispatch::{DispatchFacade, Dispatcher, RouterDispatcher};
use crate::error::BuildError;
use crate::model::Charset;

/// Instantiate one declared filter.
pub fn build_filter(config: &FilterConfig) -> Result<Arc<dyn Filter>, BuildError> {
    let invalid = |reason: String| BuildError::Filter {
        kind: config.kind().to_string(),
        reason,
    };
    let status = |code: u16| StatusCode::from_u16(code).map_err(|e| invalid(e.to_string()));
    let header_name =
        |name: &str| HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()));

    let filter: Arc<dyn Filter> = match config {
        FilterConfig::DenyPath {
            path,
            status: code,
            message,
        } => Arc::new(DenyPathFilter::new(path.clone(), status(*code)?, message.clone())),
        FilterConfig::RequireHeader {
            header,
            status: code,
        } => Arc::new(RequireHeaderFilter::new(header.clone(), status(*code)?)),
        FilterConfig::ResponseHeader { name, value } => {
            let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
            Arc::new(ResponseHeaderFilter::new(header_name(name)?, value))
        }
        FilterConfig::RequestId { header } => Arc::new(RequestIdFilter::new(header_name(header)?)),
    };
    Ok(filter)
}

pub struct ProxyBuilder {
    config: ProxyConfig,
    extra_filters: Vec<Arc<dyn Filter>>,
}

impl ProxyBuilder {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            extra_filters: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Register a filter in code. It runs after every declared filter.
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.extra_filters.push(Arc::new(filter));
        self
    }

    pub fn filter_arc(mut self, filter: Arc<dyn Filter>) -> Self {
        self.extra_filters.push(filter);
        self
    }

    /// Freeze filters and `dispatcher` into a facade.
    pub fn build<D: Dispatcher + 'static>(&self, dispatcher: D) -> Result<DispatchFacade, BuildError> {
        validate_config(&self.config)
            .map_err(|errors| BuildError::Config(ConfigError::Validation(errors)))?;

        let charset = Charset::from_label(&self.config.dispatch.default_charset).map_err(|e| {
            BuildError::Config(ConfigError::Validation(vec![ValidationError {
                field: "dispatch.default_charset".to_string(),
                message: e.to_string(),
            }]))
        })?;

        let mut filters = self
            .config
            .filters
            .iter()
            .map(build_filter)
            .collect::<Result<Vec<_>, _>>()?;
        filters.extend(self.extra_filters.iter().cloned());

        let facade = DispatchFacade::new(filters, Arc::new(dispatcher))
            .with_default_charset(charset)
            .with_metrics(self.config.observability.metrics_enabled);

        tracing::debug!(
            filters = ?facade.filter_names(),
            charset = %charset,
            "Dispatch facade assembled"
        );
        Ok(facade)
    }

    /// Build with an axum router as the dispatch engine.
    pub fn build_router(&self, router: Router) -> Result<DispatchFacade, BuildError> {
        let dispatcher =
            RouterDispatcher::new(router)?.with_body_limit(self.config.dispatch.max_body_size);
        self.build(dispatcher)
    }
}
