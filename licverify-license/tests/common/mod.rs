//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use licverify_license::trust::{Certificate, PrivateKey, parse_certificate, parse_private_key};
use licverify_license::{LicenseEnvelope, LicenseRecord, LicenseSchema, LicenseTerms, Validator};

pub const TEST_DOMAIN: &str = "licensing-test.omnistrate.dev";

pub const CERT_PEM: &str = include_str!("../fixtures/licensing_test_cert.pem");
pub const CHAIN_PEM: &str = include_str!("../fixtures/licensing_test_chain.pem");
pub const KEY_PEM: &str = include_str!("../fixtures/licensing_test_key.pem");

/// Envelope captured from the licensing service (legacy SKU schema, dummy signature).
pub const SKU_ENVELOPE_JSON: &str = r#"{"license":{"ID":"08ca5ce0-a9e7-4a0c-9f16-fad135af05d3","CreationTime":"2025-02-25T20:19:40Z","ExpirationTime":"2025-03-04T20:19:40Z","Description":"License for licensing-example-java (licensing-example-java)","InstanceID":"instance-qzey2t5ik","SubscriptionID":"sub-Q4Or8FBVd0","SKU":"PRODUCT-SAMPLE-JAVA-SKU-UNIQUE-VALUE","Version":1},"signature":"ZHVtbXk="}"#;

pub const ORG_ID: &str = "org-Hk3sQ1";
pub const PLAN_ID: &str = "pt-plan-7Xv9";
pub const INSTANCE_ID: &str = "instance-qzey2t5ik";

/// An instant inside the fixture certificate's validity window.
pub fn inside_window() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
}

pub fn test_certificate() -> Certificate {
    parse_certificate(CERT_PEM.as_bytes()).unwrap()
}

pub fn test_key() -> PrivateKey {
    parse_private_key(KEY_PEM.as_bytes()).unwrap()
}

/// A validator trusting the fixture certificate.
pub fn test_validator() -> Validator {
    Validator::new(test_certificate(), Vec::new()).unwrap()
}

pub fn test_terms() -> LicenseTerms {
    LicenseTerms {
        organization_id: ORG_ID.to_string(),
        product_plan_id: PLAN_ID.to_string(),
        instance_id: INSTANCE_ID.to_string(),
        subscription_id: "sub-Q4Or8FBVd0".to_string(),
        description: "License for licensing-example".to_string(),
        schema: LicenseSchema::ProductPlan,
    }
}

/// A record created at `created` that lasts `days`.
pub fn record_for(created: DateTime<Utc>, days: i64) -> LicenseRecord {
    LicenseRecord::new(test_terms(), created, created + Duration::days(days))
}

/// A fixture-signed envelope created at `created` that lasts `days`.
pub fn signed_envelope(created: DateTime<Utc>, days: i64) -> LicenseEnvelope {
    LicenseEnvelope::sign(record_for(created, days), &test_key()).unwrap()
}
