//! Heuristic classification of arbitrary failures into (category, code).
//!
//! Two tiers, first match wins. Tier 1 walks the failure's `source()` chain
//! looking for well-known sentinel failures by identity; tier 2 falls back
//! to ordered substring matching over the rendered message. Exact checks run
//! first so that, say, a storage failure whose text happens to contain
//! "timeout" still resolves to its storage classification instead of the
//! generic timeout pattern. Both tiers are plain data tables so the rule set
//! stays inspectable and extensible without touching control flow.

use std::error::Error;

use thiserror::Error as ThisError;

use crate::app_error::AppError;
use crate::category::{code, ErrorCategory};
use crate::logging::log_debug;

/// Well-known marker failures from the platform's deadline/cancellation and
/// storage subsystems.
///
/// Classification matches these by identity (chain membership plus `==`),
/// never by message text. Services surface them from their storage and
/// runtime layers; the classifier only depends on their stable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ThisError)]
pub enum Sentinel {
    /// The operation ran past its deadline.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
    /// The operation was canceled before completing.
    #[error("operation canceled")]
    Canceled,
    /// Lookup by the storage layer found no matching record.
    #[error("record not found")]
    RecordNotFound,
    /// A row query returned an empty result set.
    #[error("no rows in result set")]
    NoRows,
    /// The transaction was already committed or rolled back.
    #[error("transaction has already been committed or rolled back")]
    TransactionDone,
    /// The database connection was already closed.
    #[error("connection is already closed")]
    ConnectionClosed,
    /// A destructive statement was issued without a WHERE clause.
    #[error("WHERE conditions required")]
    MissingWhereClause,
    /// The queried relation is not supported by the storage layer.
    #[error("unsupported relation")]
    UnsupportedRelation,
    /// The operation requires a primary key on the model.
    #[error("primary key required")]
    PrimaryKeyRequired,
    /// The transaction handle is invalid.
    #[error("invalid transaction")]
    InvalidTransaction,
    /// The storage driver does not implement the operation.
    #[error("not implemented")]
    NotImplemented,
}

/// The (category, code) pair produced by classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: ErrorCategory,
    pub code: String,
}

impl Classification {
    fn new(category: ErrorCategory, code: &str) -> Self {
        Self {
            category,
            code: code.to_string(),
        }
    }
}

/// Tier-1 rule: an exact sentinel mapped to a fixed classification.
#[derive(Debug, Clone, Copy)]
pub struct SentinelRule {
    pub sentinel: Sentinel,
    pub category: ErrorCategory,
    pub code: &'static str,
}

/// Tier-2 rule: a group of message substrings mapped to a classification.
/// Needles are matched against the lower-cased rendered message; any needle
/// in the group matching selects the rule.
#[derive(Debug, Clone, Copy)]
pub struct MessageRule {
    pub needles: &'static [&'static str],
    pub category: ErrorCategory,
    pub code: &'static str,
}

/// Default tier-1 table.
pub const DEFAULT_SENTINEL_RULES: &[SentinelRule] = &[
    SentinelRule {
        sentinel: Sentinel::DeadlineExceeded,
        category: ErrorCategory::Internal,
        code: code::INTERNAL_TIMEOUT,
    },
    SentinelRule {
        sentinel: Sentinel::Canceled,
        category: ErrorCategory::Internal,
        code: code::OPERATION_CANCELED,
    },
    SentinelRule {
        sentinel: Sentinel::RecordNotFound,
        category: ErrorCategory::NotFound,
        code: code::RESOURCE_NOT_FOUND,
    },
    SentinelRule {
        sentinel: Sentinel::NoRows,
        category: ErrorCategory::NotFound,
        code: code::RESOURCE_NOT_FOUND,
    },
    SentinelRule {
        sentinel: Sentinel::TransactionDone,
        category: ErrorCategory::Internal,
        code: code::DATABASE_ERROR,
    },
    SentinelRule {
        sentinel: Sentinel::ConnectionClosed,
        category: ErrorCategory::Internal,
        code: code::DATABASE_CONNECTION,
    },
    SentinelRule {
        sentinel: Sentinel::MissingWhereClause,
        category: ErrorCategory::Validation,
        code: code::INVALID_INPUT,
    },
    SentinelRule {
        sentinel: Sentinel::UnsupportedRelation,
        category: ErrorCategory::Internal,
        code: code::DATABASE_ERROR,
    },
    SentinelRule {
        sentinel: Sentinel::PrimaryKeyRequired,
        category: ErrorCategory::Validation,
        code: code::REQUIRED_FIELD,
    },
    SentinelRule {
        sentinel: Sentinel::InvalidTransaction,
        category: ErrorCategory::Internal,
        code: code::DATABASE_ERROR,
    },
    SentinelRule {
        sentinel: Sentinel::NotImplemented,
        category: ErrorCategory::Internal,
        code: code::DATABASE_ERROR,
    },
];

/// Default tier-2 table, ordered most-specific first. Group order is part of
/// the contract: parse/format wording is checked before generic validation
/// wording, constraint wording before auth wording, network wording before
/// the broad timeout group.
pub const DEFAULT_MESSAGE_RULES: &[MessageRule] = &[
    // Parse/format failures
    MessageRule {
        needles: &["json", "unmarshal", "deserialize", "parse", "invalid character"],
        category: ErrorCategory::Validation,
        code: code::INVALID_FORMAT,
    },
    // Generic validation wording
    MessageRule {
        needles: &["validation failed", "invalid format", "malformed"],
        category: ErrorCategory::Validation,
        code: code::INVALID_FORMAT,
    },
    // Missing-field wording
    MessageRule {
        needles: &["required", "missing"],
        category: ErrorCategory::Validation,
        code: code::REQUIRED_FIELD,
    },
    // Range wording
    MessageRule {
        needles: &["out of range", "too large", "too small"],
        category: ErrorCategory::Validation,
        code: code::INVALID_RANGE,
    },
    // Uniqueness constraints
    MessageRule {
        needles: &["duplicate key", "unique constraint", "already exists"],
        category: ErrorCategory::Conflict,
        code: code::RESOURCE_EXISTS,
    },
    // Foreign-key constraints
    MessageRule {
        needles: &["foreign key constraint", "violates foreign key"],
        category: ErrorCategory::Validation,
        code: code::INVALID_INPUT,
    },
    // Not-null constraints
    MessageRule {
        needles: &["not null constraint", "violates not-null"],
        category: ErrorCategory::Validation,
        code: code::REQUIRED_FIELD,
    },
    // Check constraints
    MessageRule {
        needles: &["check constraint"],
        category: ErrorCategory::Validation,
        code: code::INVALID_RANGE,
    },
    // Authentication wording
    MessageRule {
        needles: &["unauthorized", "invalid credentials", "authentication failed"],
        category: ErrorCategory::Authentication,
        code: code::INVALID_CREDENTIALS,
    },
    // Token wording
    MessageRule {
        needles: &["token expired", "jwt expired"],
        category: ErrorCategory::Authentication,
        code: code::TOKEN_EXPIRED,
    },
    MessageRule {
        needles: &["invalid token", "malformed token"],
        category: ErrorCategory::Authentication,
        code: code::TOKEN_INVALID,
    },
    // Authorization wording
    MessageRule {
        needles: &["forbidden", "access denied", "permission denied"],
        category: ErrorCategory::Authorization,
        code: code::ACCESS_DENIED,
    },
    // Rate limiting
    MessageRule {
        needles: &["rate limit", "too many requests", "quota exceeded"],
        category: ErrorCategory::RateLimit,
        code: code::RATE_LIMIT_EXCEEDED,
    },
    // Network wording
    MessageRule {
        needles: &[
            "connection refused",
            "connection reset",
            "no such host",
            "network is unreachable",
        ],
        category: ErrorCategory::External,
        code: code::EXTERNAL_ERROR,
    },
    // Timeout wording
    MessageRule {
        needles: &["timeout", "deadline exceeded"],
        category: ErrorCategory::External,
        code: code::EXTERNAL_TIMEOUT,
    },
    // Upstream-unavailable wording
    MessageRule {
        needles: &["service unavailable", "bad gateway", "gateway timeout"],
        category: ErrorCategory::Unavailable,
        code: code::EXTERNAL_UNAVAILABLE,
    },
    // Filesystem wording
    MessageRule {
        needles: &["file not found", "no such file"],
        category: ErrorCategory::NotFound,
        code: code::RESOURCE_NOT_FOUND,
    },
    // Configuration wording
    MessageRule {
        needles: &["configuration", "config", "environment"],
        category: ErrorCategory::Internal,
        code: code::CONFIGURATION_ERROR,
    },
];

/// Classifier over extensible sentinel and message rule tables.
///
/// [`classify`] covers the common case with the default tables; build a
/// `Classifier` to register additional rules for failure sources the
/// defaults do not know about.
#[derive(Debug, Clone)]
pub struct Classifier {
    sentinel_rules: Vec<SentinelRule>,
    message_rules: Vec<MessageRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// A classifier with the default rule tables installed.
    pub fn new() -> Self {
        Self {
            sentinel_rules: DEFAULT_SENTINEL_RULES.to_vec(),
            message_rules: DEFAULT_MESSAGE_RULES.to_vec(),
        }
    }

    /// A classifier with caller-supplied tables, replacing the defaults.
    pub fn with_rules(sentinel_rules: Vec<SentinelRule>, message_rules: Vec<MessageRule>) -> Self {
        Self {
            sentinel_rules,
            message_rules,
        }
    }

    /// Registers an additional tier-1 rule. Later registrations lose to
    /// earlier ones on the same sentinel.
    pub fn add_sentinel_rule(&mut self, rule: SentinelRule) {
        self.sentinel_rules.push(rule);
    }

    /// Registers an additional tier-2 rule, tried after the existing groups.
    pub fn add_message_rule(&mut self, rule: MessageRule) {
        self.message_rules.push(rule);
    }

    pub fn sentinel_rules(&self) -> &[SentinelRule] {
        &self.sentinel_rules
    }

    pub fn message_rules(&self) -> &[MessageRule] {
        &self.message_rules
    }

    /// Classifies a failure against this classifier's tables.
    pub fn classify(&self, err: &(dyn Error + 'static)) -> Classification {
        classify_with(&self.sentinel_rules, &self.message_rules, err)
    }
}

/// Classifies a failure using the default rule tables.
///
/// Total: every failure yields a defined pair; nothing recognizable in
/// either tier yields `(Internal, INTERNAL_ERROR)`.
pub fn classify(err: &(dyn Error + 'static)) -> Classification {
    classify_with(DEFAULT_SENTINEL_RULES, DEFAULT_MESSAGE_RULES, err)
}

/// Chain-aware check for the storage layer's two "nothing there" sentinels.
pub fn is_record_not_found(err: &(dyn Error + 'static)) -> bool {
    chain_contains(err, Sentinel::RecordNotFound) || chain_contains(err, Sentinel::NoRows)
}

/// Finds an [`AppError`] anywhere in the failure's chain.
pub fn find_app_error<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a AppError> {
    error_chain(err)
        .into_iter()
        .find_map(|e| e.downcast_ref::<AppError>())
}

/// Whether the failure or anything beneath it is the given sentinel.
pub fn chain_contains(err: &(dyn Error + 'static), sentinel: Sentinel) -> bool {
    error_chain(err)
        .iter()
        .any(|e| e.downcast_ref::<Sentinel>() == Some(&sentinel))
}

fn classify_with(
    sentinel_rules: &[SentinelRule],
    message_rules: &[MessageRule],
    err: &(dyn Error + 'static),
) -> Classification {
    // An already-classified error anywhere in the chain keeps its pair.
    if let Some(app) = find_app_error(err) {
        return Classification::new(app.category(), app.code());
    }

    let chain = error_chain(err);

    // Tier 1: exact sentinel identity, deepest link first.
    for link in chain.iter().rev() {
        if let Some(found) = link.downcast_ref::<Sentinel>() {
            for rule in sentinel_rules {
                if rule.sentinel == *found {
                    return Classification::new(rule.category, rule.code);
                }
            }
        }
    }

    // Tier 2: staged substring matching over the rendered chain text.
    let text = chain
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
        .to_lowercase();
    for rule in message_rules {
        if rule.needles.iter().any(|needle| text.contains(needle)) {
            return Classification::new(rule.category, rule.code);
        }
    }

    log_debug!(message = %text, "no classification rule matched, defaulting to internal");
    Classification::new(ErrorCategory::Internal, code::INTERNAL_ERROR)
}

/// The failure and every antecedent reachable through `source()`, outermost
/// first.
fn error_chain<'a>(err: &'a (dyn Error + 'static)) -> Vec<&'a (dyn Error + 'static)> {
    let mut chain = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        chain.push(e);
        current = e.source();
    }
    chain
}
