//! Dispatch engine contract.

use crate::error::DispatchError;
use crate::model::{CanonicalRequest, CanonicalResponse};

/// The web application being adapted.
///
/// Must complete synchronously: when `handle` returns, the response is fully written.
pub trait Dispatcher: Send + Sync {
    fn handle(
        &self,
        req: &CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<(), DispatchError>;
}

/// A dispatch engine backed by a closure.
pub struct FnDispatcher<F>(F);

impl<F> Dispatcher for FnDispatcher<F>
where
    F: Fn(&CanonicalRequest, &mut CanonicalResponse) -> Result<(), DispatchError> + Send + Sync,
{
    fn handle(
        &self,
        req: &CanonicalRequest,
        resp: &mut CanonicalResponse,
    ) -> Result<(), DispatchError> {
        (self.0)(req, resp)
    }
}

/// Build a dispatch engine from a closure.
pub fn dispatcher_fn<F>(f: F) -> FnDispatcher<F>
where
    F: Fn(&CanonicalRequest, &mut CanonicalResponse) -> Result<(), DispatchError> + Send + Sync,
{
    FnDispatcher(f)
}
