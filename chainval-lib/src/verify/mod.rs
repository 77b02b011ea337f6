//! Certificate chain validation against a validation policy.
//!
//! The entry point is [`validate_chain`]: it runs, per certificate of a
//! leaf-first chain, the ordered list of constraint checks configured by
//! the policy, and aggregates one [`Conclusion`] per certificate plus one
//! for the whole chain. Whole-chain algorithms (certificate-policy tree,
//! name constraints) execute once, anchored to the leaf certificate's
//! block.

mod checks;
mod constraints;
mod engine;
mod policy_tree;
mod revocation;

use crate::model::Certificate;
use crate::policy::{Context, SubContext, ValidationPolicy};
use crate::ChainvalError;
use serde::Serialize;
use std::collections::HashMap;

/// Top-level verdict of a validation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Indication {
    Passed,
    Indeterminate,
    Failed,
}

/// Closed-set refinement of a non-passed [`Indication`]
/// (ETSI TS 119 102-1 sub-indications used by certificate validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubIndication {
    OutOfBoundsNoPoe,
    RevokedNoPoe,
    RevokedCaNoPoe,
    ChainConstraintsFailure,
    CertificateChainGeneralFailure,
    CryptoConstraintsFailureNoPoe,
    TryLater,
}

/// Identifier of the check a message originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageTag {
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
    Cryptographic,
    NotExpired,
    QcCompliance,
    QcSscd,
    QcTypes,
    QcLegislation,
    MinQcTransactionLimit,
    MinQcRetentionPeriod,
    QcSemanticsIdentifier,
}

impl MessageTag {
    /// Statement describing the failed expectation.
    pub fn failure_text(&self) -> &'static str {
        match self {
            MessageTag::SerialNumberPresent => "The serial number is absent!",
            MessageTag::IssuerKnown => "The issuer name does not match the issuer certificate!",
            MessageTag::CaFlag => "The certificate is not a CA but issues certificates!",
            MessageTag::KeyCertSign => "The keyCertSign usage is absent for a CA certificate!",
            MessageTag::MaxPathLength => "The maximum path length is exceeded!",
            MessageTag::PolicyTree => "The certificate policy tree is not valid!",
            MessageTag::NameConstraints => {
                "The subject name is not in the permitted name-constraint subtrees!"
            }
            MessageTag::RevocationDataAvailable => "No revocation data found for the certificate!",
            MessageTag::AcceptableRevocationFound => {
                "No acceptable revocation data found for the certificate!"
            }
            MessageTag::NotRevoked => "The certificate is revoked!",
            MessageTag::NotOnHold => "The certificate is on hold!",
            MessageTag::RevocationFreshness => "The revocation data is not considered fresh!",
            MessageTag::Cryptographic => {
                "The cryptographic constraints are not met for the certificate!"
            }
            MessageTag::NotExpired => "The validation time is outside the certificate validity range!",
            MessageTag::QcCompliance => "The certificate is not a qualified certificate!",
            MessageTag::QcSscd => {
                "The private key is not declared to reside in a qualified creation device!"
            }
            MessageTag::QcTypes => "The certificate type is not among the accepted QC types!",
            MessageTag::QcLegislation => {
                "The certificate legislation is not among the accepted country codes!"
            }
            MessageTag::MinQcTransactionLimit => {
                "The transaction limit is below the required minimum!"
            }
            MessageTag::MinQcRetentionPeriod => {
                "The retention period is below the required minimum!"
            }
            MessageTag::QcSemanticsIdentifier => {
                "The semantics identifier is not among the accepted values!"
            }
        }
    }
}

/// One message recorded against a conclusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub tag: MessageTag,
    pub text: String,
}

impl Message {
    pub(crate) fn new(tag: MessageTag, detail: Option<String>) -> Self {
        let text = match detail {
            Some(detail) => format!("{} ({})", tag.failure_text(), detail),
            None => tag.failure_text().to_string(),
        };
        Self { tag, text }
    }
}

/// Outcome of a validation block: the verdict plus recorded messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conclusion {
    pub indication: Indication,
    pub sub_indication: Option<SubIndication>,
    pub errors: Vec<Message>,
    pub warnings: Vec<Message>,
    pub infos: Vec<Message>,
}

impl Conclusion {
    pub(crate) fn passed() -> Self {
        Self {
            indication: Indication::Passed,
            sub_indication: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.indication == Indication::Passed
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.indication, self.sub_indication) {
            (Indication::Passed, _) => write!(f, "PASSED"),
            (indication, Some(sub)) => write!(f, "{:?}/{:?}", indication, sub),
            (indication, None) => write!(f, "{:?}", indication),
        }
    }
}

/// Summary of the revocation record applied to a revoked certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevocationInfo {
    pub revocation_id: String,
    pub revocation_date: Option<i64>,
    pub reason: Option<crate::model::RevocationReason>,
}

/// Validation result for a single certificate of the chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateValidationResult {
    pub certificate_id: String,
    /// Whether the certificate is a trust anchor (its checks are skipped).
    pub trust_anchor: bool,
    pub self_signed: bool,
    pub conclusion: Conclusion,
    /// Present when the applied revocation record reports the certificate
    /// revoked or on hold.
    pub revocation: Option<RevocationInfo>,
}

/// Validation result for the whole chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainValidationResult {
    /// Per-certificate results, leaf first.
    pub certificate_results: Vec<CertificateValidationResult>,
    /// Aggregated verdict: the first non-passed certificate conclusion
    /// (leaf first), or PASSED.
    pub conclusion: Conclusion,
}

impl std::fmt::Display for ChainValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(leaf) = self.certificate_results.first() {
            write!(f, "{}, ", leaf.certificate_id)?;
        }
        write!(f, "{}", self.conclusion)
    }
}

/// Revocation records gathered per certificate, keyed by certificate id.
#[derive(Debug, Clone, Default)]
pub struct RevocationData {
    records: HashMap<String, Vec<crate::model::Revocation>>,
}

impl RevocationData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a revocation record for a certificate.
    pub fn add(&mut self, certificate_id: impl Into<String>, record: crate::model::Revocation) {
        self.records
            .entry(certificate_id.into())
            .or_default()
            .push(record);
    }

    /// All records gathered for a certificate.
    pub fn for_certificate(&self, certificate_id: &str) -> &[crate::model::Revocation] {
        self.records
            .get(certificate_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Options controlling a validation run.
#[derive(Debug, Clone)]
pub struct ChainValidationOptions {
    /// Context the chain is validated under.
    pub context: Context,
    /// Validation time, Unix seconds. For timestamp contexts the caller
    /// passes the applicable best-signature-time here.
    pub validation_time: i64,
    /// Time the run is performed at, for cryptographic constraints.
    /// Defaults to `validation_time`.
    pub current_time: Option<i64>,
}

impl ChainValidationOptions {
    /// Validate under the signature context at the given time.
    pub fn at(validation_time: i64) -> Self {
        Self {
            context: Context::Signature,
            validation_time,
            current_time: None,
        }
    }
}

/// Validate a certificate chain against a validation policy.
///
/// The chain is ordered leaf first: `[signing certificate,
/// intermediates..., root]`. Each certificate gets its own block of
/// ordered checks; trust anchors skip their block. The per-chain
/// conclusion is the first non-passed per-certificate conclusion, leaf
/// first, with warnings and informational messages from every block
/// carried over.
///
/// The run is a pure function of its arguments: no clock is read beyond
/// the supplied times and no check ever panics or returns early with an
/// error. The only error is an empty chain.
pub fn validate_chain(
    chain: &[Certificate],
    revocation_data: &RevocationData,
    policy: &ValidationPolicy,
    options: &ChainValidationOptions,
) -> Result<ChainValidationResult, ChainvalError> {
    if chain.is_empty() {
        return Err(ChainvalError::EmptyChain);
    }
    let current_time = options.current_time.unwrap_or(options.validation_time);

    let mut certificate_results = Vec::with_capacity(chain.len());
    for (position, certificate) in chain.iter().enumerate() {
        let sub_context = if position == 0 {
            SubContext::SigningCert
        } else {
            SubContext::CaCertificate
        };
        let env = checks::CertificateContext {
            chain,
            position,
            context: options.context,
            sub_context,
            policy,
            revocations: revocation_data.for_certificate(&certificate.id),
            validation_time: options.validation_time,
            current_time,
        };
        let (conclusion, revocation) = checks::run_certificate_checks(&env);
        certificate_results.push(CertificateValidationResult {
            certificate_id: certificate.id.clone(),
            trust_anchor: certificate.trusted,
            self_signed: certificate.self_signed,
            conclusion,
            revocation,
        });
    }

    let conclusion = aggregate(&certificate_results);
    Ok(ChainValidationResult {
        certificate_results,
        conclusion,
    })
}

/// Roll per-certificate conclusions up into the chain conclusion.
fn aggregate(results: &[CertificateValidationResult]) -> Conclusion {
    let mut conclusion = Conclusion::passed();
    for result in results {
        conclusion
            .warnings
            .extend(result.conclusion.warnings.iter().cloned());
        conclusion
            .infos
            .extend(result.conclusion.infos.iter().cloned());
    }
    if let Some(first_failed) = results.iter().find(|r| !r.conclusion.is_passed()) {
        conclusion.indication = first_failed.conclusion.indication;
        conclusion.sub_indication = first_failed.conclusion.sub_indication;
        conclusion
            .errors
            .extend(first_failed.conclusion.errors.iter().cloned());
    }
    conclusion
}
