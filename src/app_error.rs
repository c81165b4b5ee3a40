//! The structured application error value.
//!
//! `AppError` is the one error shape call sites, logging, and API responses
//! depend on: a category, a stable code, a human message, optional details,
//! an HTTP status, and a causal chain back to the originating failure.
//! Construction never fails and no operation here panics; invalid input is
//! normalized or ignored so that error-construction code is never itself a
//! source of faults.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::{code, message, ErrorCategory};
use crate::chain::{BoxError, CauseChain};
use crate::classifier::classify;
use crate::logging::{log_debug, log_warn};

/// Convenient result alias for fallible service operations.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Structured application error with HTTP mapping and a causal chain.
///
/// The serialized projection carries category, code, message, and the
/// optional details/status fields; the causal chain is diagnostics-only and
/// never serializes.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppError {
    category: ErrorCategory,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    http_status: Option<u16>,
    #[serde(skip, default)]
    cause: CauseChain,
}

fn normalize_message(message: String) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        message::UNKNOWN_ERROR.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize_code(code: String) -> String {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        code::INTERNAL_ERROR.to_string()
    } else {
        trimmed.to_string()
    }
}

impl AppError {
    /// Creates an internal error with a generic code and a backtrace
    /// anchored at the caller.
    pub fn new(message: impl Into<String>) -> Self {
        let message = normalize_message(message.into());
        Self {
            category: ErrorCategory::Internal,
            code: code::INTERNAL_ERROR.to_string(),
            http_status: Some(ErrorCategory::Internal.default_http_status()),
            cause: CauseChain::capture(&message),
            message,
            details: None,
        }
    }

    /// Creates an error with a caller-supplied category and code.
    ///
    /// Blank code and message normalize to the generic defaults; the HTTP
    /// status starts at the category's default.
    pub fn categorized(
        category: ErrorCategory,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let message = normalize_message(message.into());
        Self {
            category,
            code: normalize_code(code.into()),
            http_status: Some(category.default_http_status()),
            cause: CauseChain::capture(&message),
            message,
            details: None,
        }
    }

    /// Wraps an arbitrary failure into an `AppError`. Total: never fails.
    ///
    /// A failure that already is an `AppError` keeps its category, code,
    /// details, and status; only the message changes and the chain grows by
    /// one link. Anything else is run through the classifier and becomes the
    /// chain's innermost link.
    pub fn wrap<E>(err: E, message: impl Into<String>) -> Self
    where
        E: Into<BoxError>,
    {
        let message = normalize_message(message.into());
        match err.into().downcast::<AppError>() {
            Ok(app) => {
                let mut app = *app;
                app.cause.push(&message);
                app.message = message;
                app
            }
            Err(foreign) => {
                let classified = classify(foreign.as_ref());
                log_debug!(
                    category = %classified.category,
                    code = %classified.code,
                    "classified wrapped failure"
                );
                Self {
                    category: classified.category,
                    http_status: Some(classified.category.default_http_status()),
                    code: classified.code,
                    cause: CauseChain::wrapping(foreign, &message),
                    message,
                    details: None,
                }
            }
        }
    }

    /// [`wrap`](Self::wrap) for optional failures: absent input behaves like
    /// [`new`](Self::new).
    pub fn wrap_opt(err: Option<BoxError>, message: impl Into<String>) -> Self {
        match err {
            Some(err) => Self::wrap(err, message),
            None => Self::new(message),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional details; `None` when absent.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// The explicit HTTP status override, if one is set.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// The status a transport should use: the explicit override when set,
    /// else the category's default. Resolved on read so that changing the
    /// category without touching the status stays consistent.
    pub fn effective_http_status(&self) -> u16 {
        self.http_status
            .unwrap_or_else(|| self.category.default_http_status())
    }

    /// The causal chain, for diagnostics.
    pub fn cause(&self) -> &CauseChain {
        &self.cause
    }

    // Fluent setters. Each takes the value by move and hands it back, so a
    // construction-then-configuration phase reads as one chain and there is
    // no receiver that could be absent.

    /// Sets the category. Does not touch the explicit HTTP status; use the
    /// `into_*` conversions to recategorize with a status recompute.
    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets the code. Blank input is ignored.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        let trimmed = code.trim();
        if !trimmed.is_empty() {
            self.code = trimmed.to_string();
        }
        self
    }

    /// Sets the message. Blank input is ignored.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        let trimmed = message.trim();
        if !trimmed.is_empty() {
            self.message = trimmed.to_string();
        }
        self
    }

    /// Sets the details. Blank input clears them; this is the one setter
    /// where blank is meaningful.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        let details = details.into();
        let trimmed = details.trim();
        self.details = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Overrides the HTTP status. Values outside [100, 599] are ignored
    /// rather than corrupting state.
    pub fn with_http_status(mut self, status: u16) -> Self {
        if (100..=599).contains(&status) {
            self.http_status = Some(status);
        } else {
            log_warn!(status, "ignoring out-of-range HTTP status override");
        }
        self
    }

    /// Replaces the causal chain with one that wraps the given failure
    /// under this error's current message.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.cause = CauseChain::wrapping(cause.into(), self.message.clone());
        self
    }

    /// Sets code and message together; blank inputs are ignored per field.
    pub fn with_code_and_message(
        self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.with_code(code).with_message(message)
    }

    /// Category change that also recomputes the explicit status to the new
    /// category's default. Backs the `into_*` conversions.
    pub(crate) fn recategorized(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self.http_status = Some(category.default_http_status());
        self
    }

    pub fn is_category(&self, category: ErrorCategory) -> bool {
        self.category == category
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }

    /// One link up the causal chain, if any.
    pub fn immediate_cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.immediate()
    }

    /// The deepest failure in the causal chain, if any.
    pub fn root_cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.root()
    }

    /// The rendered capture-time stack of the causal chain, or a placeholder
    /// when no capture exists. Never fails.
    pub fn stack_trace(&self) -> String {
        self.cause.render()
    }

    /// [`stack_trace`](Self::stack_trace) as cleaned lines: control
    /// characters stripped, blanks dropped.
    pub fn stack_trace_lines(&self) -> Vec<String> {
        self.cause.render_lines()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.category, self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " - {details}")?;
        }
        Ok(())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.immediate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Sentinel;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Plain(String);

    fn plain(message: &str) -> Plain {
        Plain(message.to_string())
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_defaults() {
        let err = AppError::new("something broke");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.code(), code::INTERNAL_ERROR);
        assert_eq!(err.message(), "something broke");
        assert_eq!(err.effective_http_status(), 500);
        assert!(err.details().is_none());
    }

    #[test]
    fn test_new_blank_message_normalizes() {
        let err = AppError::new("   ");
        assert_eq!(err.message(), message::UNKNOWN_ERROR);
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.code(), code::INTERNAL_ERROR);
    }

    #[test]
    fn test_categorized() {
        let err = AppError::categorized(
            ErrorCategory::Validation,
            code::VALIDATION_ERROR,
            "name too short",
        );
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert_eq!(err.effective_http_status(), 400);
    }

    #[test]
    fn test_categorized_normalizes_blank_code() {
        let err = AppError::categorized(ErrorCategory::NotFound, "  ", "");
        assert_eq!(err.code(), code::INTERNAL_ERROR);
        assert_eq!(err.message(), message::UNKNOWN_ERROR);
        // Category survives normalization untouched.
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_default_status_per_category() {
        for category in ErrorCategory::ALL {
            let err = AppError::categorized(category, "", "");
            assert_eq!(err.effective_http_status(), category.default_http_status());
        }
    }

    // ==================== Wrap Tests ====================

    #[test]
    fn test_wrap_classifies_foreign_failure() {
        let err = AppError::wrap(plain("duplicate key value violates unique constraint"), "save user");
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(err.code(), code::RESOURCE_EXISTS);
        assert_eq!(err.message(), "save user");
        assert_eq!(err.effective_http_status(), 409);
    }

    #[test]
    fn test_wrap_unclassifiable_defaults_to_internal() {
        let err = AppError::wrap(plain("weird"), "op failed");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.code(), code::INTERNAL_ERROR);
    }

    #[test]
    fn test_wrap_preserves_existing_classification() {
        let first = AppError::categorized(ErrorCategory::Validation, code::INVALID_INPUT, "bad id")
            .with_details("id must be a uuid")
            .with_http_status(422);
        let second = AppError::wrap(first, "create order");

        assert_eq!(second.category(), ErrorCategory::Validation);
        assert_eq!(second.code(), code::INVALID_INPUT);
        assert_eq!(second.details(), Some("id must be a uuid"));
        assert_eq!(second.effective_http_status(), 422);
        assert_eq!(second.message(), "create order");
    }

    #[test]
    fn test_rewrap_is_idempotent_on_classification() {
        let a = AppError::wrap(plain("connection refused"), "m1");
        let b = AppError::wrap(a, "m2");
        let a2 = AppError::wrap(plain("connection refused"), "m1");

        assert_eq!(b.category(), a2.category());
        assert_eq!(b.code(), a2.code());
    }

    #[test]
    fn test_wrap_opt_absent() {
        let err = AppError::wrap_opt(None, "nothing underneath");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.code(), code::INTERNAL_ERROR);
        assert!(err.immediate_cause().is_none());
    }

    #[test]
    fn test_wrap_sentinel() {
        let err = AppError::wrap(Sentinel::DeadlineExceeded, "load profile");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.code(), code::INTERNAL_TIMEOUT);
    }

    // ==================== Chain Traversal Tests ====================

    #[test]
    fn test_three_link_chain_traversal() {
        let original = plain("original failure");
        let a = AppError::wrap(original, "wrap A");
        let b = AppError::wrap(a, "wrap B");

        assert_eq!(b.root_cause().unwrap().to_string(), "original failure");
        // Immediate is the previous wrap step, not the original.
        assert_eq!(b.immediate_cause().unwrap().to_string(), "wrap A");
        assert_eq!(b.cause().len(), 2);
    }

    #[test]
    fn test_wrap_grows_chain_by_one() {
        let a = AppError::wrap(plain("boom"), "m1");
        assert_eq!(a.cause().len(), 1);
        let b = AppError::wrap(a, "m2");
        assert_eq!(b.cause().len(), 2);
        let c = AppError::wrap(b, "m3");
        assert_eq!(c.cause().len(), 3);
    }

    #[test]
    fn test_with_cause_replaces_chain() {
        let err = AppError::new("op failed").with_cause(plain("root cause"));
        assert_eq!(err.immediate_cause().unwrap().to_string(), "root cause");
        assert_eq!(err.root_cause().unwrap().to_string(), "root cause");
    }

    #[test]
    fn test_error_source_is_immediate_cause() {
        let err = AppError::wrap(plain("underneath"), "top");
        let source = (&err as &dyn Error).source().unwrap();
        assert_eq!(source.to_string(), "underneath");
    }

    // ==================== Mutator Tests ====================

    #[test]
    fn test_with_code_ignores_blank() {
        let err = AppError::new("x").with_code("  ");
        assert_eq!(err.code(), code::INTERNAL_ERROR);
        let err = err.with_code("NEW_CODE");
        assert_eq!(err.code(), "NEW_CODE");
    }

    #[test]
    fn test_with_message_ignores_blank() {
        let err = AppError::new("keep me").with_message("\t ");
        assert_eq!(err.message(), "keep me");
        let err = err.with_message("updated");
        assert_eq!(err.message(), "updated");
    }

    #[test]
    fn test_with_details_blank_clears() {
        let err = AppError::new("x").with_details("some context");
        assert_eq!(err.details(), Some("some context"));
        let err = err.with_details("  ");
        assert!(err.details().is_none());
    }

    #[test]
    fn test_with_http_status_rejects_out_of_range() {
        let err = AppError::new("x").with_http_status(422);
        assert_eq!(err.effective_http_status(), 422);

        let err = err.with_http_status(99);
        assert_eq!(err.effective_http_status(), 422);
        let err = err.with_http_status(600);
        assert_eq!(err.effective_http_status(), 422);
    }

    #[test]
    fn test_category_change_keeps_explicit_status() {
        let err = AppError::new("x")
            .with_http_status(422)
            .with_category(ErrorCategory::NotFound);
        assert_eq!(err.effective_http_status(), 422);
    }

    #[test]
    fn test_effective_status_falls_back_to_category() {
        // Deserialized bodies arrive with no explicit status; the accessor
        // must derive from the category.
        let err: AppError = serde_json::from_str(
            r#"{"category":"NOT_FOUND","code":"RESOURCE_NOT_FOUND","message":"gone"}"#,
        )
        .unwrap();
        assert!(err.http_status().is_none());
        assert_eq!(err.effective_http_status(), 404);
    }

    #[test]
    fn test_with_code_and_message() {
        let err = AppError::new("x").with_code_and_message("NEW_CODE", "new message");
        assert_eq!(err.code(), "NEW_CODE");
        assert_eq!(err.message(), "new message");
    }

    // ==================== Predicate and Rendering Tests ====================

    #[test]
    fn test_predicates() {
        let err = AppError::categorized(ErrorCategory::Conflict, code::RESOURCE_EXISTS, "taken");
        assert!(err.is_category(ErrorCategory::Conflict));
        assert!(!err.is_category(ErrorCategory::Internal));
        assert!(err.has_code(code::RESOURCE_EXISTS));
        assert!(!err.has_code(code::INTERNAL_ERROR));
    }

    #[test]
    fn test_display_without_details() {
        let err = AppError::categorized(ErrorCategory::NotFound, code::RESOURCE_NOT_FOUND, "user gone");
        assert_eq!(err.to_string(), "[NOT_FOUND] RESOURCE_NOT_FOUND: user gone");
    }

    #[test]
    fn test_display_with_details() {
        let err = AppError::categorized(ErrorCategory::NotFound, code::RESOURCE_NOT_FOUND, "user gone")
            .with_details("id 42");
        assert_eq!(
            err.to_string(),
            "[NOT_FOUND] RESOURCE_NOT_FOUND: user gone - id 42"
        );
    }

    #[test]
    fn test_stack_trace_contains_message() {
        let err = AppError::new("an error occurred");
        assert!(err.stack_trace().contains("an error occurred"));
        let lines = err.stack_trace_lines();
        assert!(!lines.is_empty());
        assert!(lines[0].contains("an error occurred"));
    }

    // ==================== Projection Tests ====================

    #[test]
    fn test_projection_minimal_fields() {
        let err: AppError = serde_json::from_str(
            r#"{"category":"VALIDATION","code":"INVALID_INPUT","message":"bad"}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&err).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object["category"], "VALIDATION");
        assert_eq!(object["code"], "INVALID_INPUT");
        assert_eq!(object["message"], "bad");
    }

    #[test]
    fn test_projection_never_includes_cause() {
        let err = AppError::wrap(plain("secret internals"), "public message").with_details("ctx");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("secret internals"));
        assert!(!json.contains("cause"));
        assert!(json.contains("\"details\":\"ctx\""));
        assert!(json.contains("\"http_status\":500"));
    }

    #[test]
    fn test_unknown_category_on_wire_normalizes() {
        let err: AppError =
            serde_json::from_str(r#"{"category":"BRAND_NEW","code":"C","message":"m"}"#).unwrap();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
