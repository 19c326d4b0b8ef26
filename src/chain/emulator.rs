//! Single-use filter chain.
//!
//! # States
//! ```text
//! NotStarted → Completed   (run)
//! Completed  → error       (run again: ChainAlreadyRun)
//! ```
//!
//! # Design Decisions
//! - Filter list is borrowed from the facade; the chain itself owns only its cursor
//! - The dispatch step is appended here, never supplied by configuration
//! - Errors from filters or the dispatch engine pass through untouched

use std::sync::Arc;

use crate::chain::filter::{ChainState, Filter, Next};
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::model::{CanonicalRequest, CanonicalResponse};

/// What happened during a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOutcome {
    /// Configured filters that were entered.
    pub filters_entered: usize,
    /// Whether the dispatch engine was reached.
    pub dispatched: bool,
}

impl ChainOutcome {
    /// True when a filter halted the chain before the dispatch engine.
    pub fn short_circuited(&self) -> bool {
        !self.dispatched
    }
}

/// Terminal step invoking the wrapped dispatch engine.
struct DispatchFilter<'a> {
    dispatcher: &'a dyn Dispatcher,
}

impl Filter for DispatchFilter<'_> {
    fn name(&self) -> &str {
        "dispatch"
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        _next: Next<'_>,
    ) -> Result<(), DispatchError> {
        self.dispatcher.handle(req, resp)
    }
}

pub struct FilterChain<'a> {
    filters: &'a [Arc<dyn Filter>],
    terminal: DispatchFilter<'a>,
    state: ChainState,
    completed: bool,
}

impl<'a> FilterChain<'a> {
    pub fn new(filters: &'a [Arc<dyn Filter>], dispatcher: &'a dyn Dispatcher) -> Self {
        Self {
            filters,
            terminal: DispatchFilter { dispatcher },
            state: ChainState::default(),
            completed: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Run filters in registration order, then the dispatch engine.
    pub fn run(
        &mut self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<ChainOutcome, DispatchError> {
        if self.completed {
            tracing::error!(
                request_id = %req.request_id(),
                "Filter chain run twice"
            );
            return Err(DispatchError::ChainAlreadyRun);
        }
        self.completed = true;

        Next::new(self.filters, &self.terminal, &self.state).run(req, resp)?;
        resp.commit();

        let outcome = ChainOutcome {
            filters_entered: self.state.entered.get(),
            dispatched: self.state.dispatched.get(),
        };
        if outcome.short_circuited() {
            tracing::debug!(
                request_id = %req.request_id(),
                filters_entered = outcome.filters_entered,
                "Filter chain short-circuited"
            );
        }
        Ok(outcome)
    }
}
