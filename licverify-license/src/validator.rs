//! License validation against a trusted signing certificate.

use crate::envelope::LicenseEnvelope;
use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use licverify_trust::{
    Certificate, ChainValidator, RsaPkcs1Sha256, SignatureScheme, ValidatedChain,
    parse_certificate_chain,
};
use std::sync::Arc;
use tracing::debug;

/// Identifiers a license must carry. `None` or empty matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedLicense<'a> {
    pub organization_id: Option<&'a str>,
    pub product_plan_id: Option<&'a str>,
    pub instance_id: Option<&'a str>,
}

impl<'a> ExpectedLicense<'a> {
    /// Matches any license.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn organization(mut self, id: &'a str) -> Self {
        self.organization_id = Some(id);
        self
    }

    #[must_use]
    pub fn product_plan(mut self, id: &'a str) -> Self {
        self.product_plan_id = Some(id);
        self
    }

    #[must_use]
    pub fn instance(mut self, id: &'a str) -> Self {
        self.instance_id = Some(id);
        self
    }
}

/// Validates license envelopes signed by one certificate's key.
///
/// Immutable after construction and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    certificate: Option<Certificate>,
    intermediates: Vec<Certificate>,
    chain: ChainValidator,
    scheme: Arc<dyn SignatureScheme>,
}

impl Validator {
    /// Creates a validator for licenses signed by `certificate`'s key.
    ///
    /// `intermediates` are offered to path building in
    /// [`Validator::validate_certificate`].
    ///
    /// # Errors
    ///
    /// Only fails if the compiled-in trust material is corrupt.
    pub fn new(certificate: Certificate, intermediates: Vec<Certificate>) -> LicenseResult<Self> {
        Ok(Self {
            certificate: Some(certificate),
            intermediates,
            chain: ChainValidator::new()?,
            scheme: Arc::new(RsaPkcs1Sha256),
        })
    }

    /// Creates a validator with no signing certificate. Every validation
    /// fails with [`LicenseError::MissingTrustedCertificate`].
    ///
    /// # Errors
    ///
    /// Only fails if the compiled-in trust material is corrupt.
    pub fn without_certificate() -> LicenseResult<Self> {
        Ok(Self {
            certificate: None,
            intermediates: Vec::new(),
            chain: ChainValidator::new()?,
            scheme: Arc::new(RsaPkcs1Sha256),
        })
    }

    /// Creates a validator from a PEM chain: the first certificate signs
    /// licenses, the rest are intermediates.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Trust`] if the PEM holds no parseable
    /// certificate.
    pub fn from_pem(pem: &[u8]) -> LicenseResult<Self> {
        let mut chain = parse_certificate_chain(pem)?.into_iter();
        let Some(certificate) = chain.next() else {
            return Err(LicenseError::MissingTrustedCertificate);
        };
        Self::new(certificate, chain.collect())
    }

    /// Replaces the signature scheme used for license signatures.
    #[must_use]
    pub fn with_scheme(mut self, scheme: Arc<dyn SignatureScheme>) -> Self {
        self.scheme = scheme;
        self
    }

    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    #[must_use]
    pub fn intermediates(&self) -> &[Certificate] {
        &self.intermediates
    }

    /// Validates `envelope` at instant `at`.
    ///
    /// Checks run in order and stop at the first failure:
    /// signing certificate present, envelope structure, required and expected
    /// fields, expiry, signature.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::MissingTrustedCertificate`]
    /// - [`LicenseError::InvalidEnvelope`] for a missing record or empty signature
    /// - [`LicenseError::MissingFields`] / [`LicenseError::InvalidLicense`]
    /// - [`LicenseError::LicenseExpired`]
    /// - [`LicenseError::SignatureMismatch`]
    /// - [`LicenseError::Trust`] if the certificate key is not usable
    pub fn validate_license(
        &self,
        envelope: &LicenseEnvelope,
        expected: &ExpectedLicense<'_>,
        at: DateTime<Utc>,
    ) -> LicenseResult<()> {
        let certificate = self
            .certificate
            .as_ref()
            .ok_or(LicenseError::MissingTrustedCertificate)?;

        let Some(license) = envelope.license() else {
            return Err(LicenseError::InvalidEnvelope("envelope has no license".to_string()));
        };
        if envelope.signature().is_empty() {
            return Err(LicenseError::InvalidEnvelope(
                "envelope has no signature".to_string(),
            ));
        }

        license.fields_match(
            expected.organization_id,
            expected.product_plan_id,
            expected.instance_id,
        )?;

        if license.is_expired_at(at) {
            return Err(LicenseError::LicenseExpired {
                expired_at: license.expiration_time_raw().to_string(),
            });
        }

        let verified = self.scheme.verify(
            &certificate.public_key()?,
            envelope.signature(),
            &license.canonical_bytes()?,
        )?;
        if !verified {
            return Err(LicenseError::SignatureMismatch);
        }

        debug!(
            license_id = %license.id(),
            scheme = self.scheme.name(),
            "License validated"
        );
        Ok(())
    }

    /// Parses a JSON envelope and validates it.
    ///
    /// # Errors
    ///
    /// As [`Validator::validate_license`], plus [`LicenseError::InvalidEnvelope`]
    /// on parse failure.
    pub fn validate_license_str(
        &self,
        json: &str,
        expected: &ExpectedLicense<'_>,
        at: DateTime<Utc>,
    ) -> LicenseResult<()> {
        self.validate_license(&LicenseEnvelope::parse(json)?, expected, at)
    }

    /// Parses a JSON byte envelope and validates it.
    ///
    /// # Errors
    ///
    /// As [`Validator::validate_license_str`].
    pub fn validate_license_bytes(
        &self,
        bytes: &[u8],
        expected: &ExpectedLicense<'_>,
        at: DateTime<Utc>,
    ) -> LicenseResult<()> {
        self.validate_license(&LicenseEnvelope::parse_bytes(bytes)?, expected, at)
    }

    /// Parses a base64 envelope and validates it.
    ///
    /// # Errors
    ///
    /// As [`Validator::validate_license_str`].
    pub fn validate_license_base64(
        &self,
        encoded: &str,
        expected: &ExpectedLicense<'_>,
        at: DateTime<Utc>,
    ) -> LicenseResult<()> {
        self.validate_license(&LicenseEnvelope::parse_base64(encoded)?, expected, at)
    }

    /// Validates the signing certificate's chain and domain at `at`.
    ///
    /// Independent of any license.
    ///
    /// # Errors
    ///
    /// [`LicenseError::MissingTrustedCertificate`], or [`LicenseError::Trust`]
    /// carrying the chain validation failure.
    pub fn validate_certificate(
        &self,
        expected_domain: &str,
        at: DateTime<Utc>,
    ) -> LicenseResult<ValidatedChain> {
        let certificate = self
            .certificate
            .as_ref()
            .ok_or(LicenseError::MissingTrustedCertificate)?;
        Ok(self
            .chain
            .validate(certificate, expected_domain, at, &self.intermediates)?)
    }
}
