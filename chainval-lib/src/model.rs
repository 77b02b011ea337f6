//! Certificate and revocation snapshot types consumed by chain validation.
//!
//! All types here are read-only views extracted upstream from parsed
//! signature material. The validation engine borrows them for the duration
//! of one run and never mutates them.

use serde::Serialize;
use tracing::debug;

/// Distinguished name with ordered components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DistinguishedName {
    /// Ordered list of (attribute_type, value) pairs.
    /// Attribute types use short names where known (e.g., "CN", "O", "C").
    pub components: Vec<(String, String)>,
}

impl DistinguishedName {
    /// Build a DN from a list of (attribute_type, value) pairs.
    pub fn new<T: Into<String>, V: Into<String>>(components: Vec<(T, V)>) -> Self {
        Self {
            components: components
                .into_iter()
                .map(|(t, v)| (t.into(), v.into()))
                .collect(),
        }
    }

    /// Parse an RFC 2253-style string ("CN=Alice,O=Acme,C=US") into a DN.
    ///
    /// Splits on unescaped commas; fragments without an `=` separator are
    /// not relative distinguished names and are skipped with a diagnostic.
    pub fn parse(input: &str) -> Self {
        let mut components = Vec::new();
        let mut start = 0;
        let bytes = input.as_bytes();
        let mut i = 0;
        while i <= bytes.len() {
            let at_end = i == bytes.len();
            if at_end || (bytes[i] == b',' && (i == 0 || bytes[i - 1] != b'\\')) {
                let fragment = input[start..i].trim();
                if !fragment.is_empty() {
                    match fragment.split_once('=') {
                        Some((attr, value)) => components
                            .push((attr.trim().to_string(), value.trim().replace("\\,", ","))),
                        None => {
                            debug!("not a relative distinguished name: '{}'", fragment);
                        }
                    }
                }
                start = i + 1;
            }
            i += 1;
        }
        Self { components }
    }

    /// Look up the first value for an attribute type.
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.components
            .iter()
            .find(|(a, _)| a == attribute)
            .map(|(_, v)| v.as_str())
    }

    /// Whether this DN has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether this DN lies within the subtree rooted at `subtree`.
    ///
    /// A DN is within a subtree when every (attribute, value) pair of the
    /// subtree appears identically among the DN's components. The empty
    /// subtree therefore contains every DN.
    pub fn is_within(&self, subtree: &DistinguishedName) -> bool {
        subtree
            .components
            .iter()
            .all(|(attr, value)| self.components.iter().any(|(a, v)| a == attr && v == value))
    }

    /// Format as a comma-separated one-line string.
    /// Example: "CN=example.com, O=Org, C=US"
    pub fn to_oneline(&self) -> String {
        let mut result = String::new();
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            result.push_str(k);
            result.push('=');
            for ch in v.chars() {
                match ch {
                    '\\' => result.push_str("\\\\"),
                    ',' => result.push_str("\\,"),
                    _ => result.push(ch),
                }
            }
        }
        result
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_oneline())
    }
}

/// GeneralName type discriminant (RFC 5280 Section 4.2.1.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneralNameKind {
    OtherName,
    Rfc822Name,
    DnsName,
    X400Address,
    DirectoryName,
    EdiPartyName,
    UniformResourceIdentifier,
    IpAddress,
    RegisteredId,
}

/// A general name as found in subjectAltName or name-constraints subtrees.
///
/// Only `DirectoryName` entries are interpreted by constraint processing;
/// the value then holds an RFC 2253-style DN string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralName {
    pub kind: GeneralNameKind,
    pub value: String,
}

impl GeneralName {
    /// Shorthand for a directoryName entry.
    pub fn directory_name(value: impl Into<String>) -> Self {
        Self {
            kind: GeneralNameKind::DirectoryName,
            value: value.into(),
        }
    }
}

/// Key usage bits (RFC 5280 Section 4.2.1.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyUsage {
    DigitalSignature,
    NonRepudiation,
    KeyEncipherment,
    DataEncipherment,
    KeyAgreement,
    KeyCertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
}

/// Where a certificate was obtained from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CertificateSource {
    /// Configured trusted store.
    TrustedStore,
    /// Trust service provider entry of a trusted list.
    TrustedList,
    #[default]
    Other,
}

/// A declared certificate policy (OID plus optional CPS pointer qualifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificatePolicy {
    pub oid: String,
    pub cps_uri: Option<String>,
}

impl CertificatePolicy {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            cps_uri: None,
        }
    }
}

/// QcStatements extension content (ETSI EN 319 412-5).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QcStatements {
    /// QcCompliance: claimed to be an EU qualified certificate.
    pub compliance: bool,
    /// QcSSCD: private key held in a qualified creation device.
    pub qscd: bool,
    /// QcType OIDs (esign / eseal / web).
    pub types: Vec<String>,
    /// QcCClegislation country codes; empty means EU legislation.
    pub legislation_countries: Vec<String>,
    /// PSD2 QcStatement roles of the payment service provider.
    pub psd2_roles: Vec<String>,
    /// PSD2 national competent authority name.
    pub psd2_authority_name: Option<String>,
    /// PSD2 national competent authority identifier.
    pub psd2_authority_id: Option<String>,
    /// QcLimitValue: (currency, amount) transaction ceiling.
    pub limit_value: Option<(String, i64)>,
    /// QcRetentionPeriod in years.
    pub retention_period: Option<u32>,
    /// QcSemanticsIdentifier OID.
    pub semantics_identifier: Option<String>,
}

/// A certificate as captured in the diagnostic snapshot.
///
/// Position in a chain is implicit: chains are leaf-first slices where the
/// element at index i is issued by the element at index i + 1, and the last
/// element is self-signed or externally trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Certificate {
    /// Stable identifier of the certificate within the snapshot.
    pub id: String,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    /// Validity start, Unix seconds.
    pub not_before: i64,
    /// Validity end, Unix seconds.
    pub not_after: i64,
    /// Serial number as hex, when captured.
    pub serial_number: Option<String>,
    /// BasicConstraints CA flag.
    pub is_ca: bool,
    pub self_signed: bool,
    /// BasicConstraints pathLenConstraint; absent means unconstrained.
    pub path_len_constraint: Option<u32>,
    /// PolicyConstraints requireExplicitPolicy skip-certs value.
    pub require_explicit_policy: Option<u32>,
    /// Name-constraints permitted subtrees.
    pub permitted_subtrees: Vec<GeneralName>,
    /// Name-constraints excluded subtrees.
    pub excluded_subtrees: Vec<GeneralName>,
    pub subject_alternative_names: Vec<GeneralName>,
    pub certificate_policies: Vec<CertificatePolicy>,
    pub key_usages: Vec<KeyUsage>,
    pub qc_statements: Option<QcStatements>,
    /// Digest algorithm of the signature covering this certificate.
    pub signature_digest_algorithm: Option<crate::crypto::DigestAlgorithm>,
    /// Encryption algorithm of the key that signed this certificate.
    pub signature_encryption_algorithm: Option<crate::crypto::EncryptionAlgorithm>,
    /// Size in bits of the key that signed this certificate.
    pub signature_key_size: Option<u32>,
    /// Whether the certificate is a trust anchor for this validation.
    pub trusted: bool,
    pub source: CertificateSource,
}

impl Certificate {
    /// Minimal certificate with the given identifier and subject/issuer names.
    pub fn new(id: impl Into<String>, subject: &str, issuer: &str) -> Self {
        Self {
            id: id.into(),
            subject: DistinguishedName::parse(subject),
            issuer: DistinguishedName::parse(issuer),
            ..Self::default()
        }
    }
}

/// Revocation data origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevocationOrigin {
    Crl,
    Ocsp,
}

/// Revocation status reported by a CRL entry or OCSP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevocationStatus {
    Good,
    Revoked,
    Unknown,
}

/// CRL reason codes (RFC 5280 Section 5.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    AaCompromise,
}

impl RevocationReason {
    /// RFC 5280-style name of the reason code.
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Unspecified => "unspecified",
            RevocationReason::KeyCompromise => "keyCompromise",
            RevocationReason::CaCompromise => "cACompromise",
            RevocationReason::AffiliationChanged => "affiliationChanged",
            RevocationReason::Superseded => "superseded",
            RevocationReason::CessationOfOperation => "cessationOfOperation",
            RevocationReason::CertificateHold => "certificateHold",
            RevocationReason::RemoveFromCrl => "removeFromCRL",
            RevocationReason::PrivilegeWithdrawn => "privilegeWithdrawn",
            RevocationReason::AaCompromise => "aACompromise",
        }
    }
}

/// One revocation record gathered for a certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revocation {
    /// Stable identifier of the record within the snapshot.
    pub id: String,
    pub origin: RevocationOrigin,
    pub status: RevocationStatus,
    pub reason: Option<RevocationReason>,
    /// When the certificate was revoked, for revoked statuses.
    pub revocation_date: Option<i64>,
    /// When the record was produced, Unix seconds.
    pub production_time: i64,
    pub this_update: Option<i64>,
    pub next_update: Option<i64>,
    /// Issuing certificate subject, when the issuer could be identified.
    pub issuer: Option<DistinguishedName>,
    /// Validity window of the issuing certificate, when known.
    pub issuer_not_before: Option<i64>,
    pub issuer_not_after: Option<i64>,
    /// OCSP certHash extension presence and match against the certificate.
    pub cert_hash_present: bool,
    pub cert_hash_match: bool,
}

impl Revocation {
    /// A good-status record produced at the given time.
    pub fn good(id: impl Into<String>, origin: RevocationOrigin, production_time: i64) -> Self {
        Self {
            id: id.into(),
            origin,
            status: RevocationStatus::Good,
            reason: None,
            revocation_date: None,
            production_time,
            this_update: Some(production_time),
            next_update: None,
            issuer: None,
            issuer_not_before: None,
            issuer_not_after: None,
            cert_hash_present: false,
            cert_hash_match: false,
        }
    }
}

/// Format a Unix-second instant as an RFC 3339 timestamp for messages.
pub(crate) fn format_instant(ts: i64) -> String {
    time::OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}
