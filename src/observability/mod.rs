//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! facade / invoker / lifecycle produce:
//!     → logging.rs (structured tracing events, request ID on every line)
//!     → metrics.rs (counters and histograms via the metrics facade)
//!
//! Consumers:
//!     → Host runtime log capture (stdout)
//!     → Whatever metrics recorder the host installs
//! ```

pub mod logging;
pub mod metrics;
