//! Revocation record selection and acceptance.
//!
//! Of the records gathered for a certificate, each one passes through the
//! acceptance checks (thisUpdate present, issuer known and valid at
//! production time, issued after the certificate, OCSP certHash match);
//! the applicable record is then the most recent acceptable one by
//! production time. Records rejected at FAIL level are dropped from
//! selection; softer levels keep the record and note the finding.

use super::checks::CertificateContext;
use super::engine::CheckOutcome;
use crate::model::{format_instant, Revocation, RevocationOrigin, RevocationStatus};
use crate::policy::{ConstraintKind, Level};

/// Outcome of the revocation selection for one certificate.
pub(crate) struct Selection<'a> {
    /// Most recent acceptable record, if any.
    pub latest: Option<&'a Revocation>,
    /// Findings to note on the certificate conclusion: level at which the
    /// finding was configured, plus its text.
    pub notes: Vec<(Level, String)>,
}

/// Acceptance findings for one record against one certificate.
fn acceptance_failures(
    record: &Revocation,
    env: &CertificateContext<'_>,
) -> Vec<(ConstraintKind, String)> {
    let certificate = env.certificate();
    let mut failures = Vec::new();

    if record.this_update.is_none() {
        failures.push((
            ConstraintKind::ThisUpdatePresent,
            format!("revocation record '{}' has no thisUpdate", record.id),
        ));
    }
    if record.issuer.is_none() {
        failures.push((
            ConstraintKind::RevocationIssuerKnown,
            format!("issuer of revocation record '{}' is unknown", record.id),
        ));
    }
    if let (Some(not_before), Some(not_after)) = (record.issuer_not_before, record.issuer_not_after)
    {
        if record.production_time < not_before || record.production_time > not_after {
            failures.push((
                ConstraintKind::RevocationIssuerValidAtProductionTime,
                format!(
                    "revocation record '{}' was produced outside its issuer validity range",
                    record.id
                ),
            ));
        }
    }
    let reference_time = record.this_update.unwrap_or(record.production_time);
    if reference_time < certificate.not_before {
        failures.push((
            ConstraintKind::RevocationAfterCertificateIssuance,
            format!(
                "revocation record '{}' predates the certificate issuance ({})",
                record.id,
                format_instant(certificate.not_before)
            ),
        ));
    }
    if record.origin == RevocationOrigin::Ocsp && record.cert_hash_present && !record.cert_hash_match
    {
        failures.push((
            ConstraintKind::RevocationHasInformationAboutCertificate,
            format!(
                "certHash of OCSP response '{}' does not match the certificate",
                record.id
            ),
        ));
    }

    failures
}

/// Select the applicable revocation record for the certificate under
/// check.
pub(crate) fn select_latest_acceptable<'a>(env: &CertificateContext<'a>) -> Selection<'a> {
    let mut notes = Vec::new();
    let mut acceptable: Vec<&Revocation> = Vec::new();

    for record in env.revocations {
        let mut rejected = false;

        if record.status == RevocationStatus::Unknown {
            notes.push((
                Level::Inform,
                format!(
                    "revocation record '{}' reports an unknown status, record skipped",
                    record.id
                ),
            ));
            continue;
        }

        for (kind, detail) in acceptance_failures(record, env) {
            let level = env
                .policy
                .level(env.context, Some(env.sub_context), kind)
                .unwrap_or(Level::Fail);
            match level {
                Level::Fail => {
                    notes.push((Level::Warn, format!("{detail}, record rejected")));
                    rejected = true;
                }
                Level::Warn | Level::Inform => notes.push((level, detail)),
                Level::Ignore => {}
            }
        }
        if !rejected {
            acceptable.push(record);
        }
    }

    let latest = acceptable
        .into_iter()
        .max_by_key(|record| record.production_time);
    Selection { latest, notes }
}

/// The certificate is not revoked with a definitive reason. Suspension
/// (certificateHold) is handled by [`not_on_hold`] instead.
pub(crate) fn not_revoked(record: &Revocation) -> CheckOutcome {
    use crate::model::RevocationReason::CertificateHold;
    if record.status == RevocationStatus::Revoked && record.reason != Some(CertificateHold) {
        let reason = record
            .reason
            .map(|r| r.as_str())
            .unwrap_or("unspecified");
        return CheckOutcome::fail_with(match record.revocation_date {
            Some(date) => format!("reason: {}, revoked on {}", reason, format_instant(date)),
            None => format!("reason: {}", reason),
        });
    }
    CheckOutcome::pass()
}

/// The certificate is not suspended.
pub(crate) fn not_on_hold(record: &Revocation) -> CheckOutcome {
    use crate::model::RevocationReason::CertificateHold;
    if record.status == RevocationStatus::Revoked && record.reason == Some(CertificateHold) {
        return CheckOutcome::fail_with(match record.revocation_date {
            Some(date) => format!("on hold since {}", format_instant(date)),
            None => "on hold".to_string(),
        });
    }
    CheckOutcome::pass()
}

/// The record is fresh enough relative to the validation time.
///
/// With a configured maximum age, thisUpdate (or production time) must not
/// be older than that age. Without one, the record's own nextUpdate is the
/// freshness horizon. A record with neither criterion available cannot be
/// evaluated and passes.
pub(crate) fn is_fresh(
    record: &Revocation,
    max_age_seconds: Option<i64>,
    validation_time: i64,
) -> CheckOutcome {
    let reference_time = record.this_update.unwrap_or(record.production_time);
    match max_age_seconds {
        Some(max_age) => {
            if validation_time - reference_time > max_age {
                return CheckOutcome::fail_with(format!(
                    "thisUpdate {} is older than the maximum accepted age of {}s",
                    format_instant(reference_time),
                    max_age
                ));
            }
            CheckOutcome::pass()
        }
        None => match record.next_update {
            Some(next_update) if next_update < validation_time => CheckOutcome::fail_with(format!(
                "nextUpdate {} is before the validation time",
                format_instant(next_update)
            )),
            _ => CheckOutcome::pass(),
        },
    }
}
