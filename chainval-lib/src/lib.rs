//! chainval-lib: X.509 certificate chain validation against a declarative
//! validation policy.
//!
//! Provides the certificate-path validation building block used when checking
//! digital signatures: given a certificate chain (leaf first), the revocation
//! data gathered for it and a resolved validation policy, it runs an ordered
//! list of constraint checks per certificate (RFC 5280 path processing,
//! name constraints, certificate-policy tree, revocation status and
//! freshness, cryptographic suite expiration, qualified-certificate
//! statements) and produces a structured verdict per certificate and per
//! chain.
//!
//! The engine is a pure computation over immutable inputs: it performs no
//! I/O, reads no clock beyond the supplied validation time, and never
//! panics on any input reachable through its public contract. Parsing of
//! certificates and retrieval of revocation data are the caller's concern;
//! the library consumes an already-extracted snapshot of both.

mod crypto;
mod model;
mod oid;
mod policy;
pub mod verify;

pub use crypto::{CryptographicSuite, DigestAlgorithm, EncryptionAlgorithm};
pub use model::{
    Certificate, CertificatePolicy, CertificateSource, DistinguishedName, GeneralName,
    GeneralNameKind, KeyUsage, QcStatements, Revocation, RevocationOrigin, RevocationReason,
    RevocationStatus,
};
pub use policy::{ConstraintKind, ConstraintValue, Context, Level, SubContext, ValidationPolicy};
pub use verify::{
    validate_chain, CertificateValidationResult, ChainValidationOptions, ChainValidationResult,
    Conclusion, Indication, Message, MessageTag, RevocationData, RevocationInfo, SubIndication,
};

/// Errors returned by chainval-lib.
///
/// Constraint violations are never errors: they surface as a structured
/// [`Conclusion`]. This type only covers misuse of the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum ChainvalError {
    #[error("empty certificate chain")]
    EmptyChain,
}
