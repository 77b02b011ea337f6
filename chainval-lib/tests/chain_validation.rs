#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end chain validation scenarios.

mod common;

use chainval_lib::*;
use common::*;

fn options() -> ChainValidationOptions {
    ChainValidationOptions::at(validation_time())
}

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn valid_chain_passes() {
    let chain = reference_chain();
    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed(), "conclusion: {:?}", result.conclusion);
    assert_eq!(result.certificate_results.len(), 3);
    for sub in &result.certificate_results {
        assert!(sub.conclusion.is_passed());
    }
    assert!(result.certificate_results[2].trust_anchor);
}

#[test]
fn intermediate_below_constrained_ca_fails_path_length() {
    // leaf <- intermediate <- CA (pathLenConstraint 0) <- root: the extra
    // intermediate under the constrained CA exhausts its budget
    let root = trusted_root("root", "CN=Root,O=Acme,C=US");
    let constrained = Certificate {
        path_len_constraint: Some(0),
        ..ca("ca", "CN=CA,O=Acme,C=US", "CN=Root,O=Acme,C=US")
    };
    let inserted = ca("int", "CN=Int,O=Acme,C=US", "CN=CA,O=Acme,C=US");
    let signer = leaf("leaf", "CN=Leaf,O=Acme,C=US", "CN=Int,O=Acme,C=US");
    let chain = vec![signer, inserted, constrained, root];

    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.indication, Indication::Indeterminate);
    assert_eq!(
        result.conclusion.sub_indication,
        Some(SubIndication::CertificateChainGeneralFailure)
    );
    let failed = &result.certificate_results[1];
    assert_eq!(failed.certificate_id, "int");
    assert_eq!(failed.conclusion.errors.len(), 1);
    assert_eq!(failed.conclusion.errors[0].tag, MessageTag::MaxPathLength);
}

#[test]
fn validation_is_deterministic() {
    let chain = reference_chain();
    let revocations = reference_revocations();
    let policy = default_policy();

    let first = validate_chain(&chain, &revocations, &policy, &options()).expect("non-empty chain");
    let second = validate_chain(&chain, &revocations, &policy, &options()).expect("non-empty chain");
    assert_eq!(first, second);
}

#[test]
fn empty_chain_is_rejected() {
    let result = validate_chain(&[], &RevocationData::new(), &default_policy(), &options());
    assert!(matches!(result, Err(ChainvalError::EmptyChain)));
}

// ---------------------------------------------------------------------------
// Short-circuiting and level semantics
// ---------------------------------------------------------------------------

#[test]
fn first_fail_short_circuits_the_block() {
    // revoked and expired: revocation checks run before the validity
    // range, so only the revocation failure may conclude the block
    let mut chain = reference_chain();
    chain[0].not_after = ts(2024, 1, 1);
    let mut revocations = RevocationData::new();
    revocations.add(
        "leaf",
        revoked_ocsp(
            "ocsp-leaf",
            ts(2025, 5, 30),
            "CN=CA,O=Acme,C=US",
            RevocationReason::KeyCompromise,
            ts(2024, 6, 1),
        ),
    );

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.indication, Indication::Indeterminate);
    assert_eq!(sub.conclusion.sub_indication, Some(SubIndication::RevokedNoPoe));
    assert_eq!(sub.conclusion.errors.len(), 1);
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::NotRevoked);
}

#[test]
fn warn_level_failure_never_changes_the_indication() {
    let mut chain = reference_chain();
    chain[0].serial_number = None;
    let policy = default_policy().with_level(
        Context::Signature,
        Some(SubContext::SigningCert),
        ConstraintKind::SerialNumberPresent,
        Level::Warn,
    );

    let result = validate_chain(&chain, &reference_revocations(), &policy, &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed());
    assert_eq!(result.conclusion.warnings.len(), 1);
    assert_eq!(result.conclusion.warnings[0].tag, MessageTag::SerialNumberPresent);
}

#[test]
fn inform_level_failure_is_recorded_as_info() {
    let mut chain = reference_chain();
    chain[0].serial_number = None;
    let policy = default_policy().with_level(
        Context::Signature,
        Some(SubContext::SigningCert),
        ConstraintKind::SerialNumberPresent,
        Level::Inform,
    );

    let result = validate_chain(&chain, &reference_revocations(), &policy, &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed());
    assert_eq!(result.conclusion.infos.len(), 1);
}

#[test]
fn ignore_level_failure_leaves_no_trace() {
    let mut chain = reference_chain();
    chain[0].serial_number = None;
    let policy = default_policy().with_level(
        Context::Signature,
        Some(SubContext::SigningCert),
        ConstraintKind::SerialNumberPresent,
        Level::Ignore,
    );

    let result = validate_chain(&chain, &reference_revocations(), &policy, &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed());
    assert!(result.conclusion.warnings.is_empty());
    assert!(result.conclusion.infos.is_empty());
}

// ---------------------------------------------------------------------------
// Revocation outcomes
// ---------------------------------------------------------------------------

#[test]
fn revoked_certificate_concludes_revoked_no_poe() {
    let chain = reference_chain();
    let mut revocations = RevocationData::new();
    revocations.add(
        "leaf",
        revoked_ocsp(
            "ocsp-leaf",
            ts(2025, 5, 30),
            "CN=CA,O=Acme,C=US",
            RevocationReason::KeyCompromise,
            ts(2024, 6, 1),
        ),
    );

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::RevokedNoPoe));
    let info = result.certificate_results[0]
        .revocation
        .as_ref()
        .expect("revocation info attached");
    assert_eq!(info.revocation_id, "ocsp-leaf");
    assert_eq!(info.reason, Some(RevocationReason::KeyCompromise));
}

#[test]
fn on_hold_certificate_concludes_try_later() {
    let chain = reference_chain();
    let mut revocations = RevocationData::new();
    revocations.add(
        "leaf",
        revoked_ocsp(
            "ocsp-leaf",
            ts(2025, 5, 30),
            "CN=CA,O=Acme,C=US",
            RevocationReason::CertificateHold,
            ts(2025, 5, 1),
        ),
    );

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::TryLater));
    assert_ne!(result.conclusion.sub_indication, Some(SubIndication::RevokedNoPoe));
    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::NotOnHold);
}

#[test]
fn missing_revocation_data_concludes_try_later() {
    let chain = reference_chain();
    let result = validate_chain(&chain, &RevocationData::new(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.indication, Indication::Indeterminate);
    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::TryLater));
    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::RevocationDataAvailable);
}

#[test]
fn latest_record_by_production_time_is_applied() {
    // an older revoked record is superseded by a newer good one
    let chain = reference_chain();
    let mut revocations = RevocationData::new();
    revocations.add(
        "leaf",
        revoked_ocsp(
            "ocsp-old",
            ts(2025, 1, 1),
            "CN=CA,O=Acme,C=US",
            RevocationReason::Superseded,
            ts(2024, 12, 1),
        ),
    );
    revocations.add("leaf", good_ocsp("ocsp-new", ts(2025, 5, 30), "CN=CA,O=Acme,C=US"));

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed(), "conclusion: {:?}", result.conclusion);
}

#[test]
fn mismatching_cert_hash_rejects_the_record() {
    let chain = reference_chain();
    let mut record = good_ocsp("ocsp-leaf", ts(2025, 5, 30), "CN=CA,O=Acme,C=US");
    record.cert_hash_present = true;
    record.cert_hash_match = false;
    let mut revocations = RevocationData::new();
    revocations.add("leaf", record);

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    // the only record is unacceptable, so no applicable revocation exists
    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::TryLater));
    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::AcceptableRevocationFound);
    assert!(!sub.conclusion.warnings.is_empty());
}

#[test]
fn stale_revocation_data_fails_freshness() {
    let chain = reference_chain();
    let mut revocations = RevocationData::new();
    revocations.add("leaf", good_ocsp("ocsp-leaf", ts(2024, 1, 1), "CN=CA,O=Acme,C=US"));
    let policy = default_policy().with_value(
        Context::Signature,
        Some(SubContext::SigningCert),
        ConstraintKind::RevocationFreshness,
        ConstraintValue::MaxAgeSeconds(30 * 24 * 3600),
    );

    let result =
        validate_chain(&chain, &revocations, &policy, &options()).expect("non-empty chain");

    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::TryLater));
    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::RevocationFreshness);
}

#[test]
fn next_update_is_the_freshness_horizon_without_a_configured_age() {
    // no maximum age configured: a record whose nextUpdate has passed is
    // no longer fresh
    let chain = reference_chain();
    let mut record = good_ocsp("ocsp-leaf", ts(2025, 1, 1), "CN=CA,O=Acme,C=US");
    record.next_update = Some(ts(2025, 2, 1));
    let mut revocations = RevocationData::new();
    revocations.add("leaf", record);

    let result = validate_chain(&chain, &revocations, &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::TryLater));
    let sub = &result.certificate_results[0];
    assert_eq!(sub.conclusion.errors[0].tag, MessageTag::RevocationFreshness);
}

// ---------------------------------------------------------------------------
// Structure checks
// ---------------------------------------------------------------------------

#[test]
fn orphan_certificate_passes_the_issuer_check() {
    // no issuer certificate at all: the issuer-name check passes by
    // design; the gap is reported by prospective-chain checks upstream
    let chain = vec![leaf("leaf", "CN=Leaf,O=Acme,C=US", "CN=Absent CA,O=Acme,C=US")];
    let policy = ValidationPolicy::new().with_level(
        Context::Signature,
        Some(SubContext::SigningCert),
        ConstraintKind::IssuerKnown,
        Level::Fail,
    );

    let result = validate_chain(&chain, &RevocationData::new(), &policy, &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed());
}

#[test]
fn issuer_name_mismatch_fails() {
    let mut chain = reference_chain();
    chain[0].issuer = DistinguishedName::parse("CN=Somebody Else,O=Acme,C=US");

    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(
        result.conclusion.sub_indication,
        Some(SubIndication::CertificateChainGeneralFailure)
    );
    assert_eq!(
        result.certificate_results[0].conclusion.errors[0].tag,
        MessageTag::IssuerKnown
    );
}

#[test]
fn non_ca_issuer_fails_the_ca_check() {
    let mut chain = reference_chain();
    chain[1].is_ca = false;

    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(
        result.conclusion.sub_indication,
        Some(SubIndication::CertificateChainGeneralFailure)
    );
    assert_eq!(
        result.certificate_results[1].conclusion.errors[0].tag,
        MessageTag::CaFlag
    );
}

#[test]
fn expired_certificate_concludes_out_of_bounds() {
    let mut chain = reference_chain();
    chain[0].not_after = ts(2024, 1, 1);

    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.conclusion.sub_indication, Some(SubIndication::OutOfBoundsNoPoe));
}

#[test]
fn trust_anchor_block_is_skipped() {
    // a trusted certificate passes its block even where a check would fail
    let mut chain = reference_chain();
    chain[1].is_ca = false;
    chain[1].trusted = true;

    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert!(result.conclusion.is_passed());
    assert!(result.certificate_results[1].trust_anchor);
}

// ---------------------------------------------------------------------------
// Result surface
// ---------------------------------------------------------------------------

#[test]
fn result_displays_as_one_line() {
    let chain = reference_chain();
    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    assert_eq!(result.to_string(), "leaf, PASSED");
}

#[test]
fn result_serializes_to_json() {
    let chain = reference_chain();
    let result = validate_chain(&chain, &reference_revocations(), &default_policy(), &options())
        .expect("non-empty chain");

    let json = serde_json::to_value(&result).expect("serializable");
    assert_eq!(json["conclusion"]["indication"], "Passed");
    assert_eq!(json["certificate_results"].as_array().map(|a| a.len()), Some(3));
}
