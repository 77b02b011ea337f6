//! The per-certificate constraint block.
//!
//! One block per certificate of the chain, with checks in a fixed order:
//! identification, chain-structure checks (CA flag, key usage, path
//! length), the whole-chain algorithms on the leaf (policy tree, name
//! constraints), revocation, cryptographic suite, validity range, and the
//! qualified-certificate statements on the signing certificate.

use super::engine::{CheckOutcome, ConstraintChain};
use super::{constraints, policy_tree, revocation};
use super::{Conclusion, Indication, MessageTag, RevocationInfo, SubIndication};
use crate::model::{format_instant, Certificate, KeyUsage, QcStatements, Revocation};
use crate::policy::{ConstraintKind, ConstraintValue, Context, Level, SubContext, ValidationPolicy};

/// Everything a check may consult for one certificate of the chain.
pub(crate) struct CertificateContext<'a> {
    /// Whole chain, leaf first.
    pub chain: &'a [Certificate],
    /// Index of the certificate under check.
    pub position: usize,
    pub context: Context,
    pub sub_context: SubContext,
    pub policy: &'a ValidationPolicy,
    /// Revocation records gathered for this certificate.
    pub revocations: &'a [Revocation],
    pub validation_time: i64,
    pub current_time: i64,
}

impl CertificateContext<'_> {
    pub fn certificate(&self) -> &Certificate {
        &self.chain[self.position]
    }

    fn level(&self, kind: ConstraintKind) -> Option<Level> {
        self.policy.level(self.context, Some(self.sub_context), kind)
    }

    fn value(&self, kind: ConstraintKind) -> Option<&ConstraintValue> {
        self.policy.value(self.context, Some(self.sub_context), kind)
    }
}

/// Failure verdict emitted when a check fails at FAIL level.
fn failure_for(tag: MessageTag, sub_context: SubContext) -> (Indication, SubIndication) {
    match tag {
        MessageTag::SerialNumberPresent
        | MessageTag::IssuerKnown
        | MessageTag::CaFlag
        | MessageTag::KeyCertSign
        | MessageTag::MaxPathLength
        | MessageTag::PolicyTree
        | MessageTag::NameConstraints => (
            Indication::Indeterminate,
            SubIndication::CertificateChainGeneralFailure,
        ),
        MessageTag::RevocationDataAvailable
        | MessageTag::AcceptableRevocationFound
        | MessageTag::NotOnHold
        | MessageTag::RevocationFreshness => (Indication::Indeterminate, SubIndication::TryLater),
        MessageTag::NotRevoked => match sub_context {
            SubContext::SigningCert => (Indication::Indeterminate, SubIndication::RevokedNoPoe),
            SubContext::CaCertificate => (Indication::Indeterminate, SubIndication::RevokedCaNoPoe),
        },
        MessageTag::Cryptographic => (
            Indication::Indeterminate,
            SubIndication::CryptoConstraintsFailureNoPoe,
        ),
        MessageTag::NotExpired => (Indication::Indeterminate, SubIndication::OutOfBoundsNoPoe),
        MessageTag::QcCompliance
        | MessageTag::QcSscd
        | MessageTag::QcTypes
        | MessageTag::QcLegislation
        | MessageTag::MinQcTransactionLimit
        | MessageTag::MinQcRetentionPeriod
        | MessageTag::QcSemanticsIdentifier => {
            (Indication::Failed, SubIndication::ChainConstraintsFailure)
        }
    }
}

/// Run the ordered constraint block for one certificate.
pub(crate) fn run_certificate_checks(
    env: &CertificateContext<'_>,
) -> (Conclusion, Option<RevocationInfo>) {
    let certificate = env.certificate();
    if certificate.trusted {
        // trust anchors are axiomatically accepted, their block is skipped
        return (Conclusion::passed(), None);
    }

    let mut chain = ConstraintChain::new();
    let sub_context = env.sub_context;

    chain.execute(
        env.level(ConstraintKind::SerialNumberPresent),
        MessageTag::SerialNumberPresent,
        failure_for(MessageTag::SerialNumberPresent, sub_context),
        || CheckOutcome::of(certificate.serial_number.is_some()),
    );

    chain.execute(
        env.level(ConstraintKind::IssuerKnown),
        MessageTag::IssuerKnown,
        failure_for(MessageTag::IssuerKnown, sub_context),
        || issuer_known(env),
    );

    if sub_context == SubContext::CaCertificate {
        chain.execute(
            env.level(ConstraintKind::CaFlag),
            MessageTag::CaFlag,
            failure_for(MessageTag::CaFlag, sub_context),
            || CheckOutcome::of(certificate.is_ca),
        );

        chain.execute(
            env.level(ConstraintKind::KeyCertSign),
            MessageTag::KeyCertSign,
            failure_for(MessageTag::KeyCertSign, sub_context),
            || CheckOutcome::of(certificate.key_usages.contains(&KeyUsage::KeyCertSign)),
        );
    }

    chain.execute(
        env.level(ConstraintKind::MaxPathLength),
        MessageTag::MaxPathLength,
        failure_for(MessageTag::MaxPathLength, sub_context),
        || max_path_length(env),
    );

    // whole-chain algorithms, run once, on the leaf block
    if env.position == 0 {
        chain.execute(
            env.level(ConstraintKind::PolicyTree),
            MessageTag::PolicyTree,
            failure_for(MessageTag::PolicyTree, sub_context),
            || policy_tree::process(env.chain),
        );

        chain.execute(
            env.level(ConstraintKind::NameConstraints),
            MessageTag::NameConstraints,
            failure_for(MessageTag::NameConstraints, sub_context),
            || constraints::process(env.chain),
        );
    }

    let revocation_info = run_revocation_checks(env, &mut chain);

    // cryptographic constraints are validated against the current time,
    // not the time returned by the validation model
    let suite = env.policy.resolved_suite(env.context, sub_context);
    chain.execute(
        suite.effective_level(env.current_time),
        MessageTag::Cryptographic,
        failure_for(MessageTag::Cryptographic, sub_context),
        || match suite.evaluate_certificate(certificate, env.current_time) {
            Some(detail) => CheckOutcome::fail_with(detail),
            None => CheckOutcome::pass(),
        },
    );

    chain.execute(
        env.level(ConstraintKind::NotExpired),
        MessageTag::NotExpired,
        failure_for(MessageTag::NotExpired, sub_context),
        || validity_range(certificate, env.validation_time),
    );

    if sub_context == SubContext::SigningCert {
        run_qc_checks(env, &mut chain);
    }

    (chain.conclude(), revocation_info)
}

/// Revocation sub-block: data availability, record selection, status,
/// suspension and freshness.
fn run_revocation_checks(
    env: &CertificateContext<'_>,
    chain: &mut ConstraintChain,
) -> Option<RevocationInfo> {
    const REVOCATION_KINDS: [ConstraintKind; 5] = [
        ConstraintKind::RevocationDataAvailable,
        ConstraintKind::AcceptableRevocationFound,
        ConstraintKind::NotRevoked,
        ConstraintKind::NotOnHold,
        ConstraintKind::RevocationFreshness,
    ];
    let configured = REVOCATION_KINDS.iter().any(|kind| env.level(*kind).is_some());
    if !configured || chain.is_short_circuited() {
        return None;
    }
    let sub_context = env.sub_context;

    chain.execute(
        env.level(ConstraintKind::RevocationDataAvailable),
        MessageTag::RevocationDataAvailable,
        failure_for(MessageTag::RevocationDataAvailable, sub_context),
        || CheckOutcome::of(!env.revocations.is_empty()),
    );

    let selection = revocation::select_latest_acceptable(env);
    for (level, text) in selection.notes {
        match level {
            Level::Warn => chain.note_warning(MessageTag::AcceptableRevocationFound, text),
            Level::Inform => chain.note_info(MessageTag::AcceptableRevocationFound, text),
            _ => {}
        }
    }

    chain.execute(
        env.level(ConstraintKind::AcceptableRevocationFound),
        MessageTag::AcceptableRevocationFound,
        failure_for(MessageTag::AcceptableRevocationFound, sub_context),
        || CheckOutcome::of(selection.latest.is_some()),
    );

    let record = selection.latest?;
    let revocation_info = if record.status == crate::model::RevocationStatus::Revoked {
        Some(RevocationInfo {
            revocation_id: record.id.clone(),
            revocation_date: record.revocation_date,
            reason: record.reason,
        })
    } else {
        None
    };

    chain.execute(
        env.level(ConstraintKind::NotRevoked),
        MessageTag::NotRevoked,
        failure_for(MessageTag::NotRevoked, sub_context),
        || revocation::not_revoked(record),
    );

    chain.execute(
        env.level(ConstraintKind::NotOnHold),
        MessageTag::NotOnHold,
        failure_for(MessageTag::NotOnHold, sub_context),
        || revocation::not_on_hold(record),
    );

    let max_age = match env.value(ConstraintKind::RevocationFreshness) {
        Some(ConstraintValue::MaxAgeSeconds(seconds)) => Some(*seconds),
        _ => None,
    };
    chain.execute(
        env.level(ConstraintKind::RevocationFreshness),
        MessageTag::RevocationFreshness,
        failure_for(MessageTag::RevocationFreshness, sub_context),
        || revocation::is_fresh(record, max_age, env.validation_time),
    );

    revocation_info
}

/// Qualified-certificate statement checks, signing certificate only.
fn run_qc_checks(env: &CertificateContext<'_>, chain: &mut ConstraintChain) {
    let certificate = env.certificate();
    let sub_context = env.sub_context;
    let qc = certificate.qc_statements.as_ref();

    chain.execute(
        env.level(ConstraintKind::QcCompliance),
        MessageTag::QcCompliance,
        failure_for(MessageTag::QcCompliance, sub_context),
        || CheckOutcome::of(qc.is_some_and(|q| q.compliance)),
    );

    chain.execute(
        env.level(ConstraintKind::QcSscd),
        MessageTag::QcSscd,
        failure_for(MessageTag::QcSscd, sub_context),
        || CheckOutcome::of(qc.is_some_and(|q| q.qscd)),
    );

    chain.execute(
        env.level(ConstraintKind::QcTypes),
        MessageTag::QcTypes,
        failure_for(MessageTag::QcTypes, sub_context),
        || match env.value(ConstraintKind::QcTypes) {
            Some(ConstraintValue::AcceptedValues(accepted)) => CheckOutcome::of(
                qc.is_some_and(|q| q.types.iter().any(|t| accepted.contains(t))),
            ),
            _ => CheckOutcome::pass(),
        },
    );

    chain.execute(
        env.level(ConstraintKind::QcLegislation),
        MessageTag::QcLegislation,
        failure_for(MessageTag::QcLegislation, sub_context),
        || qc_legislation(env.value(ConstraintKind::QcLegislation), qc),
    );

    chain.execute(
        env.level(ConstraintKind::MinQcTransactionLimit),
        MessageTag::MinQcTransactionLimit,
        failure_for(MessageTag::MinQcTransactionLimit, sub_context),
        || match env.value(ConstraintKind::MinQcTransactionLimit) {
            Some(ConstraintValue::MinValue(min)) => CheckOutcome::of(
                qc.and_then(|q| q.limit_value.as_ref())
                    .is_some_and(|(_, amount)| amount >= min),
            ),
            _ => CheckOutcome::pass(),
        },
    );

    chain.execute(
        env.level(ConstraintKind::MinQcRetentionPeriod),
        MessageTag::MinQcRetentionPeriod,
        failure_for(MessageTag::MinQcRetentionPeriod, sub_context),
        || match env.value(ConstraintKind::MinQcRetentionPeriod) {
            Some(ConstraintValue::MinValue(min)) => CheckOutcome::of(
                qc.and_then(|q| q.retention_period)
                    .is_some_and(|years| i64::from(years) >= *min),
            ),
            _ => CheckOutcome::pass(),
        },
    );

    chain.execute(
        env.level(ConstraintKind::QcSemanticsIdentifier),
        MessageTag::QcSemanticsIdentifier,
        failure_for(MessageTag::QcSemanticsIdentifier, sub_context),
        || match env.value(ConstraintKind::QcSemanticsIdentifier) {
            Some(ConstraintValue::AcceptedValues(accepted)) => CheckOutcome::of(
                qc.and_then(|q| q.semantics_identifier.as_ref())
                    .is_some_and(|id| accepted.contains(id)),
            ),
            _ => CheckOutcome::pass(),
        },
    );
}

/// Accepted legislation country codes: an empty accepted set requires a
/// certificate under EU legislation (no country codes); a non-empty set
/// requires at least one declared code to be accepted.
fn qc_legislation(
    expectation: Option<&ConstraintValue>,
    qc: Option<&QcStatements>,
) -> CheckOutcome {
    match expectation {
        Some(ConstraintValue::AcceptedValues(accepted)) => {
            let declared: &[String] = qc.map(|q| q.legislation_countries.as_slice()).unwrap_or(&[]);
            if accepted.is_empty() {
                CheckOutcome::of(declared.is_empty())
            } else {
                CheckOutcome::of(declared.iter().any(|c| accepted.contains(c)))
            }
        }
        _ => CheckOutcome::pass(),
    }
}

/// The issuer certificate, when present in the chain, carries the subject
/// name this certificate claims as issuer. A certificate with no issuer
/// in the chain passes: the missing link is reported by the prospective
/// chain checks upstream, not here.
fn issuer_known(env: &CertificateContext<'_>) -> CheckOutcome {
    let certificate = env.certificate();
    match env.chain.get(env.position + 1) {
        Some(issuer) => {
            if certificate.issuer == issuer.subject {
                CheckOutcome::pass()
            } else {
                CheckOutcome::fail_with(format!(
                    "issuer name '{}' does not match '{}'",
                    certificate.issuer, issuer.subject
                ))
            }
        }
        None => CheckOutcome::pass(),
    }
}

/// RFC 5280 Section 6.1.4 (l)-(m) path length accounting over this
/// certificate's issuing chain. Self-signed certificates do not consume
/// the budget; a pathLenConstraint clamps it downward.
fn max_path_length(env: &CertificateContext<'_>) -> CheckOutcome {
    let sub_chain = &env.chain[env.position..];
    let mut max_path_length = sub_chain.len() as i64 + 1;
    for certificate in sub_chain.iter().skip(1).rev() {
        if !certificate.self_signed {
            max_path_length -= 1;
        }
        if let Some(path_len) = certificate.path_len_constraint {
            max_path_length = max_path_length.min(i64::from(path_len));
        }
    }
    if max_path_length > 0 {
        CheckOutcome::pass()
    } else {
        CheckOutcome::fail_with("the issuing chain exhausts a pathLenConstraint")
    }
}

/// The validation time falls inside the certificate validity range.
fn validity_range(certificate: &Certificate, validation_time: i64) -> CheckOutcome {
    if validation_time < certificate.not_before {
        return CheckOutcome::fail_with(format!(
            "certificate is not yet valid at {} (notBefore {})",
            format_instant(validation_time),
            format_instant(certificate.not_before)
        ));
    }
    if validation_time > certificate.not_after {
        return CheckOutcome::fail_with(format!(
            "certificate is expired at {} (notAfter {})",
            format_instant(validation_time),
            format_instant(certificate.not_after)
        ));
    }
    CheckOutcome::pass()
}
