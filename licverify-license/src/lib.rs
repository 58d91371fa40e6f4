//! Signed license envelopes and offline license validation.
//!
//! This crate handles:
//! - License records with a canonical, reproducible byte form
//! - Envelopes pairing a record with its SHA-256/RSA signature
//! - Validation of envelopes against a trusted signing certificate
//! - File-based validation for deployed instances (paths, environment, defaults)
//!
//! # Validation order
//!
//! [`Validator::validate_license`] fails fast, in this order: signing
//! certificate configured, envelope structure, required and expected fields,
//! expiry, signature. Certificate trust is a separate step,
//! [`Validator::validate_certificate`], which chains the signing certificate
//! to ISRG Root X1 and checks its domain.
//!
//! # Wire format
//!
//! ```text
//! {"license":{"ID":"…","CreationTime":"…","ExpirationTime":"…",…,"Version":1},"signature":"<base64>"}
//! ```
//!
//! License files hold this JSON or its base64 encoding.

pub mod config;
mod envelope;
mod error;
mod record;
pub mod timestamp;
mod validator;

pub use config::{
    ValidationOptions, ValidatorConfig, validate_license_for, validate_license_with_config,
    validate_license_with_options,
};
pub use envelope::LicenseEnvelope;
pub use error::{LicenseError, LicenseResult};
pub use record::{LicenseRecord, LicenseSchema, LicenseTerms};
pub use validator::{ExpectedLicense, Validator};

pub use licverify_trust as trust;
