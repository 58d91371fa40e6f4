//! Shared test helpers for trust tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use licverify_trust::{Certificate, PrivateKey, parse_certificate, parse_private_key};

pub const TEST_DOMAIN: &str = "licensing-test.omnistrate.dev";

pub const CERT_PEM: &str = include_str!("../fixtures/licensing_test_cert.pem");
pub const CHAIN_PEM: &str = include_str!("../fixtures/licensing_test_chain.pem");
pub const KEY_PEM: &str = include_str!("../fixtures/licensing_test_key.pem");
pub const KEY_PKCS8_PEM: &str = include_str!("../fixtures/licensing_test_key_pkcs8.pem");

/// An instant inside the fixture certificate's validity window.
pub fn inside_window() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
}

/// The R11-issued fixture certificate for [`TEST_DOMAIN`].
pub fn test_certificate() -> Certificate {
    parse_certificate(CERT_PEM.as_bytes()).unwrap()
}

/// The private key matching [`test_certificate`].
pub fn test_key() -> PrivateKey {
    parse_private_key(KEY_PEM.as_bytes()).unwrap()
}
