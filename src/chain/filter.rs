//! Filter contract and the continuation handed to each filter.

use std::cell::Cell;
use std::sync::Arc;

use crate::error::DispatchError;
use crate::model::{CanonicalRequest, CanonicalResponse};

/// A request-processing step.
///
/// A filter either calls `next.run(req, resp)` to continue the chain or returns without
/// calling it, in which case the response it wrote is final.
pub trait Filter: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError>;
}

/// Per-run bookkeeping shared by every continuation of one chain.
#[derive(Debug, Default)]
pub(crate) struct ChainState {
    pub(crate) entered: Cell<usize>,
    pub(crate) dispatched: Cell<bool>,
}

/// Continuation to the rest of the chain. Consumed on use, so it runs at most once.
pub struct Next<'a> {
    filters: &'a [Arc<dyn Filter>],
    terminal: Option<&'a dyn Filter>,
    state: &'a ChainState,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        filters: &'a [Arc<dyn Filter>],
        terminal: &'a dyn Filter,
        state: &'a ChainState,
    ) -> Self {
        Self {
            filters,
            terminal: Some(terminal),
            state,
        }
    }

    /// Invoke the next filter, or the terminal dispatch if no filters remain.
    pub fn run(
        self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<(), DispatchError> {
        match self.filters.split_first() {
            Some((filter, rest)) => {
                self.state.entered.set(self.state.entered.get() + 1);
                tracing::trace!(filter = filter.name(), "Entering filter");
                let next = Next {
                    filters: rest,
                    terminal: self.terminal,
                    state: self.state,
                };
                filter.process(req, resp, next)
            }
            None => match self.terminal {
                Some(terminal) => {
                    self.state.dispatched.set(true);
                    let end = Next {
                        filters: &[],
                        terminal: None,
                        state: self.state,
                    };
                    terminal.process(req, resp, end)
                }
                // Past the terminal step there is nothing left to run.
                None => Ok(()),
            },
        }
    }

    /// Number of filters (excluding the terminal step) still ahead.
    pub fn remaining(&self) -> usize {
        self.filters.len()
    }
}

/// A filter backed by a closure.
pub struct FnFilter<F> {
    name: String,
    f: F,
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&mut CanonicalRequest, &mut CanonicalResponse, Next<'_>) -> Result<(), DispatchError>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        req: &mut CanonicalRequest,
        resp: &mut CanonicalResponse,
        next: Next<'_>,
    ) -> Result<(), DispatchError> {
        (self.f)(req, resp, next)
    }
}

/// Build a filter from a closure.
pub fn filter_fn<F>(name: impl Into<String>, f: F) -> FnFilter<F>
where
    F: Fn(&mut CanonicalRequest, &mut CanonicalResponse, Next<'_>) -> Result<(), DispatchError>
        + Send
        + Sync,
{
    FnFilter {
        name: name.into(),
        f,
    }
}
