//! faultline - one structured error value for a whole service.
//!
//! Heterogeneous internal and third-party failures converge on a single
//! shape, [`AppError`]: a machine-readable category, a stable code, a human
//! message, optional details, an HTTP status, and a causal chain back to the
//! originating failure. Call sites, logging, and API responses all depend on
//! that shape instead of inspecting concrete failure kinds.
//!
//! Three entry points create one:
//!
//! ```
//! use faultline::{code, AppError, ErrorCategory};
//!
//! // Fresh construction
//! let err = AppError::new("cache warmup failed");
//!
//! // Explicit classification
//! let err = AppError::categorized(ErrorCategory::NotFound, code::RESOURCE_NOT_FOUND, "no such user");
//! assert_eq!(err.effective_http_status(), 404);
//!
//! // Wrapping an arbitrary failure: the classifier infers category and code
//! let io = std::io::Error::new(std::io::ErrorKind::Other, "connection refused by 10.0.0.2");
//! let err = AppError::wrap(io, "billing sync failed");
//! assert!(err.is_category(ErrorCategory::External));
//! ```
//!
//! Wrapping an error that is already an [`AppError`] preserves its
//! classification and grows the causal chain by one link; the chain itself
//! stays diagnostics-only and never reaches the serialized projection.

pub mod app_error;
pub mod category;
pub mod chain;
pub mod classifier;
mod convert;
pub mod logging;

pub use app_error::{AppError, AppResult};
pub use category::{code, message, ErrorCategory};
pub use chain::{BoxError, CauseChain, CauseFrame, NO_STACK_TRACE};
pub use classifier::{
    chain_contains, classify, find_app_error, is_record_not_found, Classification, Classifier,
    MessageRule, Sentinel, SentinelRule,
};
