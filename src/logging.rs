//! Logging utilities.
//!
//! Re-exports `tracing` macros under `log_*` names for consistent use at
//! call sites. The library only emits events; installing a subscriber is the
//! embedding application's job.

pub use tracing::{
    debug as log_debug, error as log_error, info as log_info, trace as log_trace, warn as log_warn,
};
