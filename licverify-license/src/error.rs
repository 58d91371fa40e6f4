//! Error types for license records, envelopes and validation.

use licverify_trust::TrustError;
use std::path::PathBuf;
use thiserror::Error;

/// License-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// One or more of `ID`, `CreationTime`, `ExpirationTime` is absent or empty.
    #[error("license is missing required fields: {0}")]
    MissingFields(String),

    /// A field does not match the expected value, or a timestamp is unparseable.
    #[error("invalid license: {0}")]
    InvalidLicense(String),

    /// The evaluation instant is after the license expiration time.
    #[error("license expired at {expired_at}")]
    LicenseExpired { expired_at: String },

    /// The signature does not verify over the license's canonical bytes.
    #[error("license signature does not match the signing certificate")]
    SignatureMismatch,

    /// The envelope could not be parsed, has no license or has no signature.
    #[error("invalid license envelope: {0}")]
    InvalidEnvelope(String),

    /// No signing certificate was configured on the validator.
    #[error("a trusted signing certificate is required")]
    MissingTrustedCertificate,

    /// Validation options are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A certificate or license file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Certificate, key or signature failure from the trust layer.
    #[error(transparent)]
    Trust(#[from] TrustError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
