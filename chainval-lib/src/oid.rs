//! Centralized OID string constants used throughout chainval-lib.
//!
//! Object Identifiers (OIDs) are defined by ITU-T X.660 and referenced
//! extensively in RFC 5280 (X.509) and ETSI EN 319 412 (qualified
//! certificate statements). Grouping them here avoids magic strings
//! scattered across modules and gives each OID a readable name.

// ── Certificate policies (RFC 5280 Section 4.2.1.4) ──────────────────────

/// The special policy matching any certificate policy.
pub const ANY_POLICY: &str = "2.5.29.32.0";

// ── Qualified certificate statements (ETSI EN 319 412-5) ─────────────────

/// QcCompliance: the certificate is an EU qualified certificate.
pub const QC_COMPLIANCE: &str = "0.4.0.1862.1.1";
/// QcLimitValue: transaction value limit for the certificate.
pub const QC_LIMIT_VALUE: &str = "0.4.0.1862.1.2";
/// QcRetentionPeriod: material retention period in years.
pub const QC_RETENTION_PERIOD: &str = "0.4.0.1862.1.3";
/// QcSSCD: the private key resides in a qualified creation device.
pub const QC_SSCD: &str = "0.4.0.1862.1.4";
/// QcPDS: PKI disclosure statements location.
pub const QC_PDS: &str = "0.4.0.1862.1.5";

/// QcType: certificate for electronic signatures.
pub const QC_TYPE_ESIGN: &str = "0.4.0.1862.1.6.1";
/// QcType: certificate for electronic seals.
pub const QC_TYPE_ESEAL: &str = "0.4.0.1862.1.6.2";
/// QcType: certificate for website authentication.
pub const QC_TYPE_WEB: &str = "0.4.0.1862.1.6.3";

// ── Semantics identifiers (ETSI EN 319 412-1) ────────────────────────────

/// Semantics identifier for natural persons.
pub const QCS_NATURAL_PERSON: &str = "0.4.0.194121.1.1";
/// Semantics identifier for legal persons.
pub const QCS_LEGAL_PERSON: &str = "0.4.0.194121.1.2";
