//! Offline trust primitives for license verification.
//!
//! This crate provides:
//! - PEM/DER certificate and RSA private key parsing
//! - SHA-256/RSA PKCS#1 v1.5 signing and verification
//! - Certification path validation against a compiled-in ISRG Root X1 anchor,
//!   with the Let's Encrypt R10/R11 intermediates available as path candidates
//!
//! Nothing here touches the network or the process clock: every temporal
//! decision takes an explicit evaluation instant.

pub mod anchors;
pub mod cert;
pub mod chain;
pub mod error;
pub mod signature;

pub use cert::{
    Certificate, PrivateKey, PublicKey, parse_certificate, parse_certificate_chain,
    parse_private_key,
};
pub use chain::{ChainValidator, ValidatedChain};
pub use error::{TrustError, TrustResult};
pub use signature::{RsaPkcs1Sha256, SignatureScheme, sign, verify, verify_with_certificate};
