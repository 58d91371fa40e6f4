//! SHA-256 with RSA PKCS#1 v1.5 signatures over raw bytes.
//!
//! A signature that fails to verify, including one of the wrong length or
//! one that is not valid for the key, yields `Ok(false)`. Errors are reserved
//! for keys that cannot be used at all.

use crate::cert::{Certificate, PrivateKey, PublicKey};
use crate::error::{TrustError, TrustResult};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha256;
use std::fmt;

/// A signature algorithm the license layer can sign and verify with.
pub trait SignatureScheme: Send + Sync + fmt::Debug {
    /// Algorithm name, e.g. `SHA256withRSA`.
    fn name(&self) -> &'static str;

    /// Signs `message`.
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> TrustResult<Vec<u8>>;

    /// Checks `signature` over `message`.
    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> TrustResult<bool>;
}

/// RSASSA-PKCS1-v1_5 with SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsaPkcs1Sha256;

impl SignatureScheme for RsaPkcs1Sha256 {
    fn name(&self) -> &'static str {
        "SHA256withRSA"
    }

    fn sign(&self, key: &PrivateKey, message: &[u8]) -> TrustResult<Vec<u8>> {
        let signing_key = SigningKey::<Sha256>::new(key.as_rsa().clone());
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| TrustError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    fn verify(&self, key: &PublicKey, signature: &[u8], message: &[u8]) -> TrustResult<bool> {
        let verifying_key = VerifyingKey::<Sha256>::new(key.as_rsa().clone());
        let Ok(signature) = Signature::try_from(signature) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}

/// Signs `message` with SHA-256/RSA.
///
/// # Errors
///
/// Returns [`TrustError::Signing`] if the key cannot produce a signature.
pub fn sign(key: &PrivateKey, message: &[u8]) -> TrustResult<Vec<u8>> {
    RsaPkcs1Sha256.sign(key, message)
}

/// Verifies a SHA-256/RSA signature.
///
/// # Errors
///
/// Never fails for a parsed [`PublicKey`]; mismatches return `Ok(false)`.
pub fn verify(key: &PublicKey, signature: &[u8], message: &[u8]) -> TrustResult<bool> {
    RsaPkcs1Sha256.verify(key, signature, message)
}

/// Verifies a signature with the public key embedded in `cert`.
///
/// # Errors
///
/// Returns [`TrustError::SignatureOperation`] if the certificate key is not RSA.
pub fn verify_with_certificate(
    cert: &Certificate,
    signature: &[u8],
    message: &[u8],
) -> TrustResult<bool> {
    verify(&cert.public_key()?, signature, message)
}
