//! Error categories, stable codes, and the category to HTTP status table.
//!
//! A category is the coarse classification an API consumer routes on; a code
//! is the finer-grained stable identifier inside a category. Both are wire
//! vocabulary: the strings here are a consumer-facing contract and must not
//! change between versions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error codes, grouped by the category they usually pair with.
///
/// A code is unique within its category's intended usage; the same code
/// string must never mean two different things in one deployment.
pub mod code {
    // Validation codes (400)
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const REQUIRED_FIELD: &str = "REQUIRED_FIELD";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_RANGE: &str = "INVALID_RANGE";

    // Authentication codes (401)
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const LOGIN_REQUIRED: &str = "LOGIN_REQUIRED";
    pub const AUTH_REQUIRED: &str = "AUTH_REQUIRED";

    // Authorization codes (403)
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    pub const INSUFFICIENT_PERMISSIONS: &str = "INSUFFICIENT_PERMISSIONS";
    pub const RESOURCE_FORBIDDEN: &str = "RESOURCE_FORBIDDEN";
    pub const INSUFFICIENT_ROLE: &str = "INSUFFICIENT_ROLE";

    // Resource codes (404, 409)
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const RESOURCE_EXISTS: &str = "RESOURCE_EXISTS";

    // Rate limit codes (429)
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";

    // Internal system codes (500)
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const DATABASE_CONNECTION: &str = "DATABASE_CONNECTION";
    pub const DATABASE_CONSTRAINT: &str = "DATABASE_CONSTRAINT";
    pub const INTERNAL_TIMEOUT: &str = "INTERNAL_TIMEOUT";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const OPERATION_CANCELED: &str = "OPERATION_CANCELED";

    // Request-context codes (500)
    pub const INVALID_USER_CONTEXT: &str = "INVALID_USER_CONTEXT";
    pub const ORG_CONTEXT_MISSING: &str = "ORG_CONTEXT_MISSING";
    pub const INVALID_ORG_CONTEXT: &str = "INVALID_ORG_CONTEXT";
    pub const USER_ROLE_NOT_FOUND: &str = "USER_ROLE_NOT_FOUND";
    pub const PERMISSION_CHECK_FAILED: &str = "PERMISSION_CHECK_FAILED";

    // External service codes (502)
    pub const EXTERNAL_ERROR: &str = "EXTERNAL_ERROR";
    pub const EXTERNAL_TIMEOUT: &str = "EXTERNAL_TIMEOUT";
    pub const EXTERNAL_UNAVAILABLE: &str = "EXTERNAL_UNAVAILABLE";

    // Service unavailable codes (503)
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
}

/// Canned human-readable messages for consistent reporting.
pub mod message {
    pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

    pub const AUTH_REQUIRED: &str = "Authentication required";
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials provided";

    pub const INSUFFICIENT_PERMISSIONS: &str = "Access denied - insufficient permissions";
    pub const INSUFFICIENT_ROLE: &str = "Access denied - insufficient role permissions";

    pub const INVALID_USER_CONTEXT: &str = "Invalid user context";
    pub const ORG_CONTEXT_MISSING: &str = "Organization context missing";
    pub const INVALID_ORG_CONTEXT: &str = "Invalid organization context";
    pub const USER_ROLE_NOT_FOUND: &str = "User role not found";
    pub const PERMISSION_CHECK_FAILED: &str = "Permission check failed";
}

/// The category of an application error, driving the default HTTP status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Client sent input that fails validation (400).
    Validation,
    /// Missing or invalid credentials (401).
    Authentication,
    /// Authenticated but not allowed (403).
    Authorization,
    /// Requested resource does not exist (404).
    NotFound,
    /// Resource state conflicts with the request (409).
    Conflict,
    /// Caller exceeded a request quota (429).
    RateLimit,
    /// Fault in this service (500).
    #[default]
    Internal,
    /// Upstream dependency failed (502).
    External,
    /// Service or dependency temporarily unavailable (503).
    Unavailable,
}

impl ErrorCategory {
    /// All categories, in wire order.
    pub const ALL: [ErrorCategory; 9] = [
        ErrorCategory::Validation,
        ErrorCategory::Authentication,
        ErrorCategory::Authorization,
        ErrorCategory::NotFound,
        ErrorCategory::Conflict,
        ErrorCategory::RateLimit,
        ErrorCategory::Internal,
        ErrorCategory::External,
        ErrorCategory::Unavailable,
    ];

    /// The default HTTP status for this category.
    ///
    /// Total: every category maps to exactly one status.
    pub fn default_http_status(&self) -> u16 {
        match self {
            // Client-side (4xx)
            ErrorCategory::Validation => 400,
            ErrorCategory::Authentication => 401,
            ErrorCategory::Authorization => 403,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::RateLimit => 429,

            // Server-side (5xx)
            ErrorCategory::Internal => 500,
            ErrorCategory::External => 502,
            ErrorCategory::Unavailable => 503,
        }
    }

    /// The stable wire form of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Authentication => "AUTHENTICATION",
            ErrorCategory::Authorization => "AUTHORIZATION",
            ErrorCategory::NotFound => "NOT_FOUND",
            ErrorCategory::Conflict => "CONFLICT",
            ErrorCategory::RateLimit => "RATE_LIMIT",
            ErrorCategory::Internal => "INTERNAL",
            ErrorCategory::External => "EXTERNAL",
            ErrorCategory::Unavailable => "UNAVAILABLE",
        }
    }

    /// Parses a wire-form category string.
    ///
    /// Unknown or empty input normalizes to [`ErrorCategory::Internal`]
    /// rather than failing; an unrecognized category on the wire must never
    /// break deserialization of an otherwise valid error body.
    pub fn parse(s: &str) -> ErrorCategory {
        match s.trim() {
            "VALIDATION" => ErrorCategory::Validation,
            "AUTHENTICATION" => ErrorCategory::Authentication,
            "AUTHORIZATION" => ErrorCategory::Authorization,
            "NOT_FOUND" => ErrorCategory::NotFound,
            "CONFLICT" => ErrorCategory::Conflict,
            "RATE_LIMIT" => ErrorCategory::RateLimit,
            "INTERNAL" => ErrorCategory::Internal,
            "EXTERNAL" => ErrorCategory::External,
            "UNAVAILABLE" => ErrorCategory::Unavailable,
            _ => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ErrorCategory::parse(&s))
    }
}
