//! Fluent category/code conversion shortcuts.
//!
//! Each conversion recategorizes the error, recomputes the explicit HTTP
//! status to the new category's default, and installs the matching code.
//! All of them reduce to `recategorized` + `with_code`; they exist so call
//! sites read as intent (`.into_resource_not_found()`) instead of as triples
//! of setter calls.

use crate::app_error::AppError;
use crate::category::{code, ErrorCategory};

impl AppError {
    // Validation (400)

    pub fn into_validation_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Validation).with_code(code)
    }

    pub fn into_validation(self) -> Self {
        self.into_validation_with_code(code::VALIDATION_ERROR)
    }

    pub fn into_invalid_input(self) -> Self {
        self.into_validation_with_code(code::INVALID_INPUT)
    }

    pub fn into_required_field(self) -> Self {
        self.into_validation_with_code(code::REQUIRED_FIELD)
    }

    pub fn into_invalid_format(self) -> Self {
        self.into_validation_with_code(code::INVALID_FORMAT)
    }

    pub fn into_invalid_range(self) -> Self {
        self.into_validation_with_code(code::INVALID_RANGE)
    }

    // Authentication (401)

    pub fn into_authentication(self) -> Self {
        self.recategorized(ErrorCategory::Authentication)
    }

    pub fn into_authentication_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Authentication).with_code(code)
    }

    pub fn into_invalid_credentials(self) -> Self {
        self.into_authentication_with_code(code::INVALID_CREDENTIALS)
    }

    pub fn into_token_expired(self) -> Self {
        self.into_authentication_with_code(code::TOKEN_EXPIRED)
    }

    pub fn into_token_invalid(self) -> Self {
        self.into_authentication_with_code(code::TOKEN_INVALID)
    }

    pub fn into_login_required(self) -> Self {
        self.into_authentication_with_code(code::LOGIN_REQUIRED)
    }

    // Authorization (403)

    pub fn into_authorization_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Authorization).with_code(code)
    }

    pub fn into_access_denied(self) -> Self {
        self.into_authorization_with_code(code::ACCESS_DENIED)
    }

    pub fn into_insufficient_permissions(self) -> Self {
        self.into_authorization_with_code(code::INSUFFICIENT_PERMISSIONS)
    }

    pub fn into_resource_forbidden(self) -> Self {
        self.into_authorization_with_code(code::RESOURCE_FORBIDDEN)
    }

    // Not found (404)

    pub fn into_not_found_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::NotFound).with_code(code)
    }

    pub fn into_resource_not_found(self) -> Self {
        self.into_not_found_with_code(code::RESOURCE_NOT_FOUND)
    }

    // Conflict (409)

    pub fn into_conflict_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Conflict).with_code(code)
    }

    pub fn into_resource_exists(self) -> Self {
        self.into_conflict_with_code(code::RESOURCE_EXISTS)
    }

    // Internal (500)

    pub fn into_internal_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Internal).with_code(code)
    }

    pub fn into_database_error(self) -> Self {
        self.into_internal_with_code(code::DATABASE_ERROR)
    }

    pub fn into_database_connection(self) -> Self {
        self.into_internal_with_code(code::DATABASE_CONNECTION)
    }

    pub fn into_database_timeout(self) -> Self {
        self.into_internal_with_code(code::INTERNAL_TIMEOUT)
    }

    pub fn into_database_constraint(self) -> Self {
        self.into_internal_with_code(code::DATABASE_CONSTRAINT)
    }

    pub fn into_configuration(self) -> Self {
        self.into_internal_with_code(code::CONFIGURATION_ERROR)
    }

    pub fn into_timeout(self) -> Self {
        self.into_internal_with_code(code::INTERNAL_TIMEOUT)
    }

    // Unavailable (503)

    pub fn into_unavailable_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::Unavailable).with_code(code)
    }

    pub fn into_service_unavailable(self) -> Self {
        self.into_unavailable_with_code(code::SERVICE_UNAVAILABLE)
    }

    // External (502)

    pub fn into_external_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::External).with_code(code)
    }

    pub fn into_external_timeout(self) -> Self {
        self.into_external_with_code(code::EXTERNAL_TIMEOUT)
    }

    pub fn into_external_unavailable(self) -> Self {
        self.into_external_with_code(code::EXTERNAL_UNAVAILABLE)
    }

    // Rate limit (429)

    pub fn into_rate_limit_with_code(self, code: impl Into<String>) -> Self {
        self.recategorized(ErrorCategory::RateLimit).with_code(code)
    }

    pub fn into_too_many_requests(self) -> Self {
        self.into_rate_limit_with_code(code::RATE_LIMIT_EXCEEDED)
    }
}
