//! Lazy, exactly-once facade construction.
//!
//! # Responsibilities
//! - Build the dispatch facade on the first invocation, never at load time
//! - Guarantee one successful construction per process under concurrent cold starts
//! - Serve every later invocation from a lock-free read
//!
//! # Design Decisions
//! - `ArcSwapOption` fast path; a `Mutex` serializes the slow path with a re-check
//! - A failed build publishes nothing, so the next invocation retries
//! - A panicking builder poisons nothing observable: the lock is recovered and the
//!   slot is still empty

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::dispatch::DispatchFacade;
use crate::error::BuildError;
use crate::observability::metrics;

/// A slot written at most once with a successfully built value.
pub struct LazyOnce<T> {
    ready: ArcSwapOption<T>,
    init_lock: Mutex<()>,
}

impl<T> LazyOnce<T> {
    pub fn new() -> Self {
        Self {
            ready: ArcSwapOption::empty(),
            init_lock: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<Arc<T>> {
        self.ready.load_full()
    }

    /// Return the published value, running `init` if there is none yet.
    ///
    /// Concurrent callers block while one of them runs `init`; they all observe the
    /// same `Arc` afterwards. On error the slot stays empty.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let Some(value) = self.ready.load_full() {
            return Ok(value);
        }

        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = self.ready.load_full() {
            return Ok(value);
        }

        let value = Arc::new(init()?);
        self.ready.store(Some(Arc::clone(&value)));
        Ok(value)
    }
}

impl<T> Default for LazyOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

type FacadeFactory = dyn Fn() -> Result<DispatchFacade, BuildError> + Send + Sync;

/// The process-wide facade, built by `factory` on first use.
pub struct LazyFacade {
    slot: LazyOnce<DispatchFacade>,
    factory: Box<FacadeFactory>,
}

impl LazyFacade {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<DispatchFacade, BuildError> + Send + Sync + 'static,
    {
        Self {
            slot: LazyOnce::new(),
            factory: Box::new(factory),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The facade if it is already built; never triggers construction.
    pub fn current(&self) -> Option<Arc<DispatchFacade>> {
        self.slot.get()
    }

    /// The facade, constructing it if this is a cold start.
    pub fn get(&self) -> Result<Arc<DispatchFacade>, BuildError> {
        self.slot.get_or_try_init(|| {
            let start = Instant::now();
            tracing::info!("Cold start: building dispatch facade");

            let result = (self.factory)();
            metrics::record_cold_start(result.is_ok());
            match &result {
                Ok(facade) => tracing::info!(
                    filters = ?facade.filter_names(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Dispatch facade ready"
                ),
                Err(error) => tracing::error!(
                    error = %error,
                    "Dispatch facade construction failed; next invocation will retry"
                ),
            }
            result
        })
    }
}

impl fmt::Debug for LazyFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFacade")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
