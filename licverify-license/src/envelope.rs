//! Signed license envelopes.
//!
//! Wire format:
//!
//! ```text
//! {"license":<canonical record JSON>,"signature":"<standard base64>"}
//! ```
//!
//! Unknown keys are ignored on parse. `license` may be `null`, which parses
//! but leaves the envelope structurally invalid.

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use licverify_trust::{PrivateKey, sign};
use serde::{Deserialize, Serialize};

/// A license record paired with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseEnvelope {
    #[serde(default)]
    license: Option<LicenseRecord>,
    #[serde(default, with = "signature_base64")]
    signature: Vec<u8>,
}

impl LicenseEnvelope {
    #[must_use]
    pub fn new(license: Option<LicenseRecord>, signature: Vec<u8>) -> Self {
        Self { license, signature }
    }

    /// Signs `license`'s canonical bytes with SHA-256/RSA.
    ///
    /// Intended for tooling and tests; issuance happens elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Trust`] if the key cannot sign.
    pub fn sign(license: LicenseRecord, key: &PrivateKey) -> LicenseResult<Self> {
        let signature = sign(key, &license.canonical_bytes()?)?;
        Ok(Self {
            license: Some(license),
            signature,
        })
    }

    #[must_use]
    pub fn license(&self) -> Option<&LicenseRecord> {
        self.license.as_ref()
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the record and signature, consuming the envelope.
    #[must_use]
    pub fn into_parts(self) -> (Option<LicenseRecord>, Vec<u8>) {
        (self.license, self.signature)
    }

    /// True iff a record is present and the signature is non-empty.
    ///
    /// Says nothing about whether the signature verifies or the license has
    /// expired.
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        self.license.is_some() && !self.signature.is_empty()
    }

    /// Returns true if the record is expired at `at`, or if the envelope is
    /// not structurally valid.
    #[must_use]
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        if !self.is_structurally_valid() {
            return true;
        }
        self.license
            .as_ref()
            .map_or(true, |license| license.is_expired_at(at))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Serializes to the JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] if JSON encoding fails.
    pub fn to_json(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes to UTF-8 JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] if JSON encoding fails.
    pub fn to_bytes(&self) -> LicenseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serializes to base64-encoded JSON, the form written to license files.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Serialization`] if JSON encoding fails.
    pub fn to_base64(&self) -> LicenseResult<String> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Parses the JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidEnvelope`] on malformed input.
    pub fn parse(json: &str) -> LicenseResult<Self> {
        Self::parse_bytes(json.as_bytes())
    }

    /// Parses UTF-8 JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidEnvelope`] on malformed input.
    pub fn parse_bytes(bytes: &[u8]) -> LicenseResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| LicenseError::InvalidEnvelope(format!("failed to parse envelope: {e}")))
    }

    /// Parses base64-encoded JSON. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidEnvelope`] on bad base64 or JSON.
    pub fn parse_base64(encoded: &str) -> LicenseResult<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| LicenseError::InvalidEnvelope(format!("invalid base64: {e}")))?;
        Self::parse_bytes(&bytes)
    }
}

mod signature_base64 {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) => STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}
