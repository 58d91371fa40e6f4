//! Property-based tests for license records and envelopes.
//!
//! These tests verify properties that must always hold:
//! - Envelopes survive every serialization form unchanged
//! - Canonical bytes are reproducible after a parse
//! - Expiry is monotonic around the expiration time
//! - Empty expected identifiers are wildcards

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::*;
use licverify_license::{LicenseEnvelope, LicenseRecord, LicenseSchema, LicenseTerms};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,40}").unwrap()
}

fn schema_strategy() -> impl Strategy<Value = LicenseSchema> {
    prop_oneof![Just(LicenseSchema::ProductPlan), Just(LicenseSchema::Sku)]
}

fn terms_strategy() -> impl Strategy<Value = LicenseTerms> {
    (
        text_strategy(),
        text_strategy(),
        text_strategy(),
        text_strategy(),
        text_strategy(),
        schema_strategy(),
    )
        .prop_map(
            |(organization_id, product_plan_id, instance_id, subscription_id, description, schema)| {
                LicenseTerms {
                    organization_id,
                    product_plan_id,
                    instance_id,
                    subscription_id,
                    description,
                    schema,
                }
            },
        )
}

/// Instants between 2000 and 2100 with millisecond precision.
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (946_684_800_000i64..4_102_444_800_000i64)
        .prop_map(|ms| Utc.timestamp_millis_opt(ms).unwrap())
}

fn signature_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..300)
}

// =============================================================================
// SERIALIZATION PROPERTIES
// =============================================================================

mod serialization_properties {
    use super::*;

    proptest! {
        /// parse(serialize(e)) == e for every form
        #[test]
        fn envelope_round_trips(
            terms in terms_strategy(),
            created in instant_strategy(),
            days in 0i64..3650,
            signature in signature_strategy(),
        ) {
            let record = LicenseRecord::new(terms, created, created + Duration::days(days));
            let envelope = LicenseEnvelope::new(Some(record), signature);

            prop_assert_eq!(&LicenseEnvelope::parse(&envelope.to_json().unwrap()).unwrap(), &envelope);
            prop_assert_eq!(&LicenseEnvelope::parse_bytes(&envelope.to_bytes().unwrap()).unwrap(), &envelope);
            prop_assert_eq!(&LicenseEnvelope::parse_base64(&envelope.to_base64().unwrap()).unwrap(), &envelope);
        }

        /// A parsed record re-serializes to the bytes it was parsed from
        #[test]
        fn canonical_bytes_survive_parse(terms in terms_strategy(), created in instant_strategy()) {
            let record = LicenseRecord::new(terms, created, created + Duration::days(30));
            let bytes = record.canonical_bytes().unwrap();
            let parsed: LicenseRecord = serde_json::from_slice(&bytes).unwrap();

            prop_assert_eq!(parsed.canonical_bytes().unwrap(), bytes);
            prop_assert_eq!(parsed, record);
        }
    }
}

// =============================================================================
// VALIDITY PROPERTIES
// =============================================================================

mod validity_properties {
    use super::*;

    proptest! {
        /// Not expired up to and including the expiration time, expired after it
        #[test]
        fn expiry_is_monotonic(created in instant_strategy(), offset_ms in -100_000_000i64..100_000_000) {
            let expires = created + Duration::days(30);
            let record = LicenseRecord::new(test_terms(), created, expires);
            let at = expires + Duration::milliseconds(offset_ms);

            prop_assert_eq!(record.is_expired_at(at), offset_ms > 0);
        }

        /// Empty expectations always pass; the stored values always pass
        #[test]
        fn empty_expectations_are_wildcards(terms in terms_strategy(), created in instant_strategy()) {
            let record = LicenseRecord::new(terms, created, created + Duration::days(1));

            prop_assert!(record.fields_match(None, None, None).is_ok());
            prop_assert!(record.fields_match(Some(""), Some(""), Some("")).is_ok());
            prop_assert!(record
                .fields_match(
                    Some(record.organization_id()),
                    Some(record.product_plan_id()),
                    Some(record.instance_id()),
                )
                .is_ok());
        }
    }
}
