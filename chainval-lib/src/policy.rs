//! Validation policy: per-context constraint levels and cryptographic
//! suites.
//!
//! A policy maps (context, sub-context, constraint) to an enforcement
//! [`Level`] with an explicit fallback chain: the (context, sub-context)
//! entry wins over the context-wide entry, which wins over the policy-wide
//! default. A constraint with no entry anywhere is *not enforced* and is
//! skipped silently, which is deliberately distinct from an explicit
//! [`Level::Ignore`].

use crate::crypto::CryptographicSuite;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Validation context the chain is checked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Context {
    Signature,
    CounterSignature,
    Timestamp,
    Revocation,
}

/// Position of the certificate within the chain being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubContext {
    SigningCert,
    CaCertificate,
}

/// Enforcement severity of a single constraint.
///
/// Only `Fail` can change a conclusion's Indication; the other levels
/// record messages without affecting the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    Fail,
    Warn,
    Inform,
    Ignore,
}

/// The closed set of named constraints the engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
    SerialNumberPresent,
    IssuerKnown,
    CaFlag,
    KeyCertSign,
    MaxPathLength,
    PolicyTree,
    NameConstraints,
    RevocationDataAvailable,
    AcceptableRevocationFound,
    NotRevoked,
    NotOnHold,
    RevocationFreshness,
    NotExpired,
    QcCompliance,
    QcSscd,
    QcTypes,
    QcLegislation,
    MinQcTransactionLimit,
    MinQcRetentionPeriod,
    QcSemanticsIdentifier,
    ThisUpdatePresent,
    RevocationIssuerKnown,
    RevocationIssuerValidAtProductionTime,
    RevocationAfterCertificateIssuance,
    RevocationHasInformationAboutCertificate,
}

impl ConstraintKind {
    /// Revocation-data acceptance constraints that must not silently
    /// default to "not enforced": an unset level falls back to a hard
    /// `Fail` (see [`ValidationPolicy::level`]).
    pub fn is_revocation_acceptance(&self) -> bool {
        matches!(
            self,
            ConstraintKind::ThisUpdatePresent
                | ConstraintKind::RevocationIssuerKnown
                | ConstraintKind::RevocationIssuerValidAtProductionTime
                | ConstraintKind::RevocationAfterCertificateIssuance
                | ConstraintKind::RevocationHasInformationAboutCertificate
        )
    }
}

/// Expectation attached to a constraint, for checks that compare against
/// configured values rather than a bare predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstraintValue {
    /// Accepted value set (e.g. QcType OIDs, legislation country codes).
    AcceptedValues(Vec<String>),
    /// Inclusive minimum for integer-valued statements.
    MinValue(i64),
    /// Maximum age in seconds for revocation freshness.
    MaxAgeSeconds(i64),
}

/// Resolved validation policy consumed by the constraint chain engine.
///
/// Immutable once built; shared by reference across every check of a run.
#[derive(Debug, Clone, Default)]
pub struct ValidationPolicy {
    levels: HashMap<(Context, Option<SubContext>, ConstraintKind), Level>,
    default_levels: HashMap<ConstraintKind, Level>,
    values: HashMap<(Context, Option<SubContext>, ConstraintKind), ConstraintValue>,
    default_values: HashMap<ConstraintKind, ConstraintValue>,
    global_suite: CryptographicSuite,
    context_suites: HashMap<Context, CryptographicSuite>,
    certificate_suites: HashMap<(Context, SubContext), CryptographicSuite>,
}

impl ValidationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy-wide default level for a constraint.
    pub fn with_default_level(mut self, kind: ConstraintKind, level: Level) -> Self {
        self.default_levels.insert(kind, level);
        self
    }

    /// Set a constraint level for a context, optionally narrowed to a
    /// sub-context.
    pub fn with_level(
        mut self,
        context: Context,
        sub_context: Option<SubContext>,
        kind: ConstraintKind,
        level: Level,
    ) -> Self {
        self.levels.insert((context, sub_context, kind), level);
        self
    }

    /// Set the policy-wide default expectation for a constraint.
    pub fn with_default_value(mut self, kind: ConstraintKind, value: ConstraintValue) -> Self {
        self.default_values.insert(kind, value);
        self
    }

    /// Set a constraint expectation for a context, optionally narrowed to
    /// a sub-context.
    pub fn with_value(
        mut self,
        context: Context,
        sub_context: Option<SubContext>,
        kind: ConstraintKind,
        value: ConstraintValue,
    ) -> Self {
        self.values.insert((context, sub_context, kind), value);
        self
    }

    /// Set the policy-wide default cryptographic suite.
    pub fn with_global_suite(mut self, suite: CryptographicSuite) -> Self {
        self.global_suite = suite;
        self
    }

    /// Set the cryptographic suite for a context.
    pub fn with_context_suite(mut self, context: Context, suite: CryptographicSuite) -> Self {
        self.context_suites.insert(context, suite);
        self
    }

    /// Set the cryptographic suite for certificates of a sub-context.
    pub fn with_certificate_suite(
        mut self,
        context: Context,
        sub_context: SubContext,
        suite: CryptographicSuite,
    ) -> Self {
        self.certificate_suites.insert((context, sub_context), suite);
        self
    }

    /// Resolve the level applicable to a constraint.
    ///
    /// Fallback order: (context, sub-context) entry, context-wide entry,
    /// policy-wide default, absent. `None` means "not enforced". The
    /// revocation-data acceptance constraints never resolve to absent:
    /// they fall back to a hardcoded `Fail`, kept explicit here until
    /// policies commonly configure them.
    pub fn level(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
        kind: ConstraintKind,
    ) -> Option<Level> {
        if sub_context.is_some() {
            if let Some(level) = self.levels.get(&(context, sub_context, kind)) {
                return Some(*level);
            }
        }
        if let Some(level) = self.levels.get(&(context, None, kind)) {
            return Some(*level);
        }
        if let Some(level) = self.default_levels.get(&kind) {
            return Some(*level);
        }
        if kind.is_revocation_acceptance() {
            warn!(
                "no level configured for {:?}; applying the built-in FAIL default",
                kind
            );
            return Some(Level::Fail);
        }
        debug!("constraint {:?} not configured for {:?}/{:?}", kind, context, sub_context);
        None
    }

    /// Resolve the expectation attached to a constraint, with the same
    /// fallback order as [`ValidationPolicy::level`].
    pub fn value(
        &self,
        context: Context,
        sub_context: Option<SubContext>,
        kind: ConstraintKind,
    ) -> Option<&ConstraintValue> {
        if sub_context.is_some() {
            if let Some(value) = self.values.get(&(context, sub_context, kind)) {
                return Some(value);
            }
        }
        self.values
            .get(&(context, None, kind))
            .or_else(|| self.default_values.get(&kind))
    }

    /// Effective cryptographic suite for certificates of a sub-context.
    ///
    /// The certificate suite is merged field-by-field over the context
    /// suite, which is merged over the policy-wide default.
    pub fn resolved_suite(&self, context: Context, sub_context: SubContext) -> CryptographicSuite {
        let context_suite = match self.context_suites.get(&context) {
            Some(suite) => suite.merged_over(&self.global_suite),
            None => self.global_suite.clone(),
        };
        match self.certificate_suites.get(&(context, sub_context)) {
            Some(suite) => suite.merged_over(&context_suite),
            None => context_suite,
        }
    }
}
