mod common;

use chrono::{TimeZone, Utc};
use common::*;
use licverify_trust::anchors::builtin_intermediates;
use licverify_trust::{ChainValidator, TrustError, parse_certificate_chain};

fn validator() -> ChainValidator {
    ChainValidator::new().unwrap()
}

// ── Real Let's Encrypt chain ─────────────────────────────────────

#[test]
fn leaf_validates_through_builtin_r11() {
    let chain = validator()
        .validate(&test_certificate(), TEST_DOMAIN, inside_window(), &[])
        .unwrap();

    let subjects = chain.subjects();
    assert_eq!(subjects.len(), 3);
    assert!(subjects[0].contains(TEST_DOMAIN));
    assert!(subjects[1].contains("R11"));
    assert!(subjects[2].contains("ISRG Root X1"));
}

#[test]
fn supplied_chain_duplicates_are_tolerated() {
    let pem_chain = parse_certificate_chain(CHAIN_PEM.as_bytes()).unwrap();
    let (leaf, rest) = pem_chain.split_first().unwrap();

    let chain = validator()
        .validate(leaf, TEST_DOMAIN, inside_window(), rest)
        .unwrap();
    assert_eq!(chain.len(), 3);
}

#[test]
fn supplying_the_leaf_as_intermediate_is_harmless() {
    let leaf = test_certificate();
    let chain = validator()
        .validate(&leaf, TEST_DOMAIN, inside_window(), std::slice::from_ref(&leaf))
        .unwrap();
    assert_eq!(chain.len(), 3);
}

#[test]
fn wrong_domain_is_rejected() {
    let err = validator()
        .validate(&test_certificate(), "licensing.omnistrate.cloud", inside_window(), &[])
        .unwrap_err();
    match err {
        TrustError::DomainMismatch { expected, found } => {
            assert_eq!(expected, "licensing.omnistrate.cloud");
            assert_eq!(found, vec![TEST_DOMAIN.to_string()]);
        }
        other => panic!("expected DomainMismatch, got {other:?}"),
    }
}

#[test]
fn after_window_is_expired() {
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let err = validator()
        .validate(&test_certificate(), TEST_DOMAIN, at, &[])
        .unwrap_err();
    assert!(matches!(err, TrustError::CertificateExpired { .. }), "got {err:?}");
    assert!(format!("{err}").contains("2025-05-12T14:10:38Z"));
}

#[test]
fn before_window_is_not_yet_valid() {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let err = validator()
        .validate(&test_certificate(), TEST_DOMAIN, at, &[])
        .unwrap_err();
    assert!(matches!(err, TrustError::CertificateNotYetValid { .. }), "got {err:?}");
}

#[test]
fn leaf_validation_is_deterministic() {
    let validator = validator();
    let leaf = test_certificate();
    let first = validator.validate(&leaf, TEST_DOMAIN, inside_window(), &[]).unwrap();
    let second = validator.validate(&leaf, TEST_DOMAIN, inside_window(), &[]).unwrap();
    assert_eq!(first, second);
}

// ── Built-in material as end-entity ──────────────────────────────

#[test]
fn anchor_validates_as_its_own_path() {
    let validator = validator();
    let anchor = validator.trust_anchor().clone();
    let chain = validator
        .validate(&anchor, "ISRG Root X1", inside_window(), &[])
        .unwrap();
    assert_eq!(chain.len(), 1);
}

#[test]
fn builtin_intermediate_validates_by_common_name() {
    let validator = validator();
    let r10 = builtin_intermediates().unwrap().remove(0);
    let chain = validator
        .validate(&r10, "R10", inside_window(), &[])
        .unwrap();
    assert_eq!(chain.len(), 2);
}

// ── Failure wrapping ─────────────────────────────────────────────

#[test]
fn self_signed_leaf_fails_path_building() {
    let key = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec![TEST_DOMAIN.to_string()]).unwrap();
    let rogue = params.self_signed(&key).unwrap();
    let rogue = licverify_trust::parse_certificate(rogue.pem().as_bytes()).unwrap();

    let err = validator()
        .validate(&rogue, TEST_DOMAIN, inside_window(), &[])
        .unwrap_err();
    assert!(matches!(err, TrustError::CertificateValidation(_)), "got {err:?}");
    assert!(matches!(err.root_cause(), TrustError::ChainBuild(_)));
}
