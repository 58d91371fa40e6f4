//! Error types for certificate handling and trust decisions.

use thiserror::Error;

/// Result type for trust operations.
pub type TrustResult<T> = Result<T, TrustError>;

/// Errors raised while parsing certificates and keys, producing or checking
/// signatures, and validating a certificate against the trust anchor.
#[derive(Debug, Error)]
pub enum TrustError {
    /// Certificate bytes are not a well-formed PEM/DER X.509 certificate.
    #[error("invalid certificate format: {0}")]
    CertificateFormat(String),

    /// Private key bytes are malformed or not an RSA key.
    #[error("invalid private key format: {0}")]
    KeyFormat(String),

    /// The private key could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The public key or algorithm is unusable for verification.
    #[error("signature operation failed: {0}")]
    SignatureOperation(String),

    /// The evaluation instant is after the certificate's `notAfter`.
    #[error("certificate {subject} expired at {not_after} (evaluated at {at})")]
    CertificateExpired {
        subject: String,
        not_after: String,
        at: String,
    },

    /// The evaluation instant is before the certificate's `notBefore`.
    #[error("certificate {subject} is not valid before {not_before} (evaluated at {at})")]
    CertificateNotYetValid {
        subject: String,
        not_before: String,
        at: String,
    },

    /// No certification path to the trust anchor could be built.
    #[error("failed to build certification path: {0}")]
    ChainBuild(String),

    /// Path construction or validation failed; carries the underlying cause.
    #[error("certificate path validation failed: {0}")]
    CertificateValidation(#[source] Box<TrustError>),

    /// The certificate is not bound to the expected domain.
    #[error("certificate is not valid for {expected} (found: {})", found.join(", "))]
    DomainMismatch {
        expected: String,
        found: Vec<String>,
    },
}

impl TrustError {
    /// Wraps a path-building failure as a validation error.
    pub(crate) fn validation(cause: TrustError) -> Self {
        Self::CertificateValidation(Box::new(cause))
    }

    /// Returns the innermost error, unwrapping `CertificateValidation`.
    #[must_use]
    pub fn root_cause(&self) -> &TrustError {
        match self {
            Self::CertificateValidation(inner) => inner.root_cause(),
            other => other,
        }
    }
}
