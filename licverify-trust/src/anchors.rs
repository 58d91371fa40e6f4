//! Compiled-in trust material.
//!
//! ISRG Root X1 is the only trust anchor. The Let's Encrypt R10 and R11
//! intermediates are shipped so that a bare leaf certificate can still be
//! chained, but they are only path-building candidates and must themselves
//! verify up to the root.

use crate::cert::{Certificate, parse_certificate};
use crate::error::TrustResult;

const ISRG_ROOT_X1_PEM: &str = include_str!("certs/isrg_root_x1.pem");
const LETS_ENCRYPT_R10_PEM: &str = include_str!("certs/lets_encrypt_r10.pem");
const LETS_ENCRYPT_R11_PEM: &str = include_str!("certs/lets_encrypt_r11.pem");

/// Returns the ISRG Root X1 trust anchor.
///
/// # Errors
///
/// Only fails if the embedded PEM is corrupt.
pub fn trust_anchor() -> TrustResult<Certificate> {
    parse_certificate(ISRG_ROOT_X1_PEM.as_bytes())
}

/// Returns the built-in intermediate certificates (R10, R11).
///
/// # Errors
///
/// Only fails if an embedded PEM is corrupt.
pub fn builtin_intermediates() -> TrustResult<Vec<Certificate>> {
    [LETS_ENCRYPT_R10_PEM, LETS_ENCRYPT_R11_PEM]
        .into_iter()
        .map(|pem| parse_certificate(pem.as_bytes()))
        .collect()
}
