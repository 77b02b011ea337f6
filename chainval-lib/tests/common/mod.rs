//! Shared fixtures for chain validation tests.
//!
//! Builders assemble the diagnostic-snapshot model the same way the
//! upstream extraction layer would, with sensible validity windows around
//! a 2025 validation time.

#![allow(dead_code)] // not every test file uses every fixture

use chainval_lib::*;
use time::macros::datetime;

/// Unix seconds for a calendar date at midnight UTC.
pub fn ts(year: i32, month: u8, day: u8) -> i64 {
    let month = time::Month::try_from(month).expect("valid month");
    time::Date::from_calendar_date(year, month, day)
        .expect("valid date")
        .midnight()
        .assume_utc()
        .unix_timestamp()
}

/// The default validation time used across scenarios: 2025-06-01.
pub fn validation_time() -> i64 {
    datetime!(2025-06-01 00:00 UTC).unix_timestamp()
}

/// End-entity certificate valid 2020-2030.
pub fn leaf(id: &str, subject: &str, issuer: &str) -> Certificate {
    Certificate {
        serial_number: Some("2a:71".to_string()),
        not_before: ts(2020, 1, 1),
        not_after: ts(2030, 1, 1),
        ..Certificate::new(id, subject, issuer)
    }
}

/// CA certificate valid 2019-2031 with keyCertSign.
pub fn ca(id: &str, subject: &str, issuer: &str) -> Certificate {
    Certificate {
        serial_number: Some("10:03".to_string()),
        not_before: ts(2019, 1, 1),
        not_after: ts(2031, 1, 1),
        is_ca: true,
        key_usages: vec![KeyUsage::KeyCertSign, KeyUsage::CrlSign],
        ..Certificate::new(id, subject, issuer)
    }
}

/// Self-signed trusted root valid 2015-2035.
pub fn trusted_root(id: &str, subject: &str) -> Certificate {
    Certificate {
        self_signed: true,
        trusted: true,
        not_before: ts(2015, 1, 1),
        not_after: ts(2035, 1, 1),
        ..ca(id, subject, subject)
    }
}

/// A good OCSP response produced at the given time by the given issuer.
pub fn good_ocsp(id: &str, production_time: i64, issuer: &str) -> Revocation {
    Revocation {
        issuer: Some(DistinguishedName::parse(issuer)),
        next_update: Some(production_time + 7 * 24 * 3600),
        ..Revocation::good(id, RevocationOrigin::Ocsp, production_time)
    }
}

/// A revoked variant of [`good_ocsp`].
pub fn revoked_ocsp(
    id: &str,
    production_time: i64,
    issuer: &str,
    reason: RevocationReason,
    revocation_date: i64,
) -> Revocation {
    Revocation {
        status: RevocationStatus::Revoked,
        reason: Some(reason),
        revocation_date: Some(revocation_date),
        ..good_ocsp(id, production_time, issuer)
    }
}

/// Constraint levels mirroring the shipped default policy: identification
/// and revocation checks on the signing certificate, chain-structure
/// checks on CA certificates.
pub fn default_policy() -> ValidationPolicy {
    use ConstraintKind::*;
    use SubContext::*;
    let signing: &[ConstraintKind] = &[
        IssuerKnown,
        NotExpired,
        PolicyTree,
        NameConstraints,
        RevocationDataAvailable,
        AcceptableRevocationFound,
        NotRevoked,
        NotOnHold,
        RevocationFreshness,
    ];
    let ca_certificate: &[ConstraintKind] = &[
        IssuerKnown,
        CaFlag,
        KeyCertSign,
        MaxPathLength,
        NotExpired,
    ];
    let mut policy = ValidationPolicy::new();
    for kind in signing {
        policy = policy.with_level(Context::Signature, Some(SigningCert), *kind, Level::Fail);
    }
    for kind in ca_certificate {
        policy = policy.with_level(Context::Signature, Some(CaCertificate), *kind, Level::Fail);
    }
    policy
}

/// The three-certificate chain of the reference scenario:
/// leaf <- CA (pathLenConstraint 0) <- trusted self-signed root.
pub fn reference_chain() -> Vec<Certificate> {
    let root = trusted_root("root", "CN=Root,O=Acme,C=US");
    let intermediate = Certificate {
        path_len_constraint: Some(0),
        ..ca("ca", "CN=CA,O=Acme,C=US", "CN=Root,O=Acme,C=US")
    };
    let signer = leaf("leaf", "CN=Leaf,O=Acme,C=US", "CN=CA,O=Acme,C=US");
    vec![signer, intermediate, root]
}

/// Revocation data with one good OCSP response for the reference leaf.
pub fn reference_revocations() -> RevocationData {
    let mut data = RevocationData::new();
    data.add("leaf", good_ocsp("ocsp-leaf", ts(2025, 5, 30), "CN=CA,O=Acme,C=US"));
    data
}
