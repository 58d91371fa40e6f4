//! Offline certification path validation against the compiled-in anchor.
//!
//! Validation runs three ordered phases against a single evaluation instant
//! `t`:
//!
//! 1. the end-entity validity window must contain `t`;
//! 2. a path must be built from the end-entity certificate to the anchor
//!    through a pool of candidate intermediates;
//! 3. the end-entity certificate must be bound to the expected domain.
//!
//! Pool membership confers no trust. A candidate becomes a link only when it
//! is named as the issuer, is a CA valid at `t` whose key may sign
//! certificates, its path length constraint admits the intermediates already
//! below it, and its key verifies the certificate below it. The anchor's own
//! constraints are not applied. Revocation is never checked.

use crate::anchors;
use crate::cert::Certificate;
use crate::error::{TrustError, TrustResult};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

/// Maximum number of certificates on a path, end-entity and anchor included.
const MAX_PATH_DEPTH: usize = 8;

/// A successfully validated certification path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedChain {
    certificates: Vec<Certificate>,
}

impl ValidatedChain {
    /// Certificates from end-entity to trust anchor.
    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Subject names from end-entity to trust anchor.
    #[must_use]
    pub fn subjects(&self) -> Vec<&str> {
        self.certificates.iter().map(Certificate::subject).collect()
    }

    /// Number of certificates on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Returns true if the path holds no certificates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

/// Validates end-entity certificates against ISRG Root X1.
#[derive(Debug, Clone)]
pub struct ChainValidator {
    anchor: Certificate,
    builtin: Vec<Certificate>,
}

impl ChainValidator {
    /// Creates a validator over the compiled-in anchor and intermediates.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded trust material is corrupt.
    pub fn new() -> TrustResult<Self> {
        Ok(Self {
            anchor: anchors::trust_anchor()?,
            builtin: anchors::builtin_intermediates()?,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_trust(anchor: Certificate, builtin: Vec<Certificate>) -> Self {
        Self { anchor, builtin }
    }

    /// Returns the trust anchor.
    #[must_use]
    pub fn trust_anchor(&self) -> &Certificate {
        &self.anchor
    }

    /// Returns the built-in intermediate certificates.
    #[must_use]
    pub fn builtin_intermediates(&self) -> &[Certificate] {
        &self.builtin
    }

    /// Validates `cert` for `expected_domain` at instant `at`.
    ///
    /// `intermediates` are caller-supplied path candidates, typically the
    /// rest of the PEM chain the end-entity certificate came from.
    ///
    /// # Errors
    ///
    /// - [`TrustError::CertificateNotYetValid`] / [`TrustError::CertificateExpired`]
    ///   if `at` is outside the end-entity validity window.
    /// - [`TrustError::CertificateValidation`] wrapping the path-building
    ///   failure if no path to the anchor exists.
    /// - [`TrustError::DomainMismatch`] if neither a DNS SAN entry nor the
    ///   subject CN equals `expected_domain`.
    pub fn validate(
        &self,
        cert: &Certificate,
        expected_domain: &str,
        at: DateTime<Utc>,
        intermediates: &[Certificate],
    ) -> TrustResult<ValidatedChain> {
        check_validity_window(cert, at)?;
        let chain = self
            .build_path(cert, at, intermediates)
            .map_err(TrustError::validation)?;
        check_domain(cert, expected_domain)?;

        debug!(
            subject = %cert.subject(),
            domain = %expected_domain,
            depth = chain.len(),
            "Certificate chain validated"
        );
        Ok(chain)
    }

    fn build_path(
        &self,
        leaf: &Certificate,
        at: DateTime<Utc>,
        intermediates: &[Certificate],
    ) -> TrustResult<ValidatedChain> {
        if leaf.der() == self.anchor.der() {
            return Ok(ValidatedChain {
                certificates: vec![self.anchor.clone()],
            });
        }

        let pool = self.candidate_pool(leaf, intermediates);
        let mut path = vec![leaf];
        let mut rejections = Vec::new();

        if self.extend_path(&mut path, &pool, at, &mut rejections) {
            let mut certificates: Vec<Certificate> = path.into_iter().cloned().collect();
            certificates.push(self.anchor.clone());
            Ok(ValidatedChain { certificates })
        } else {
            rejections.dedup();
            Err(TrustError::ChainBuild(format!(
                "no path from {} to trust anchor {}: {}",
                leaf.subject(),
                self.anchor.subject(),
                rejections.join("; ")
            )))
        }
    }

    /// Built-in and supplied certificates, deduplicated by DER, without the
    /// end-entity certificate or the anchor. Built-ins come first.
    fn candidate_pool<'a>(
        &'a self,
        leaf: &Certificate,
        intermediates: &'a [Certificate],
    ) -> Vec<&'a Certificate> {
        let mut pool: Vec<&Certificate> = Vec::new();
        for candidate in self.builtin.iter().chain(intermediates) {
            if candidate.der() == leaf.der() || candidate.der() == self.anchor.der() {
                continue;
            }
            if pool.iter().any(|c| c.der() == candidate.der()) {
                continue;
            }
            pool.push(candidate);
        }
        pool
    }

    fn extend_path<'a>(
        &'a self,
        path: &mut Vec<&'a Certificate>,
        pool: &[&'a Certificate],
        at: DateTime<Utc>,
        rejections: &mut Vec<String>,
    ) -> bool {
        let Some(current) = path.last().copied() else {
            return false;
        };

        if current.names_issuer(&self.anchor) {
            match current.verify_issued_by(&self.anchor) {
                Ok(()) => return true,
                Err(e) => rejections.push(format!("trust anchor rejected: {e}")),
            }
        }

        if path.len() + 1 >= MAX_PATH_DEPTH {
            rejections.push(format!("maximum path depth {MAX_PATH_DEPTH} reached"));
            return false;
        }

        let mut named = false;
        for &candidate in pool {
            if !current.names_issuer(candidate) {
                continue;
            }
            named = true;
            if path.iter().any(|c| c.der() == candidate.der()) {
                continue;
            }
            if let Err(reason) = usable_link(path, candidate, at) {
                debug!(candidate = %candidate.subject(), %reason, "Rejected path candidate");
                rejections.push(reason);
                continue;
            }

            path.push(candidate);
            if self.extend_path(path, pool, at, rejections) {
                return true;
            }
            path.pop();
        }

        if !named && !current.names_issuer(&self.anchor) {
            rejections.push(format!("no issuer certificate found for {}", current.issuer()));
        }
        false
    }
}

/// Checks `candidate` as the issuer of the last certificate on `path`.
fn usable_link(path: &[&Certificate], candidate: &Certificate, at: DateTime<Utc>) -> Result<(), String> {
    let Some(&child) = path.last() else {
        return Err("empty path".to_string());
    };
    if !candidate.is_ca() {
        return Err(format!("{} is not a CA certificate", candidate.subject()));
    }
    if !candidate.may_sign_certificates() {
        return Err(format!(
            "{} key usage does not permit certificate signing",
            candidate.subject()
        ));
    }
    if let Some(max) = candidate.path_len_constraint() {
        // Everything after the end-entity certificate sits below the candidate.
        let intermediates = path.iter().skip(1).filter(|c| !c.is_self_issued()).count();
        if intermediates > max as usize {
            return Err(format!(
                "{} path length constraint {max} exceeded by {intermediates} intermediate(s)",
                candidate.subject()
            ));
        }
    }
    if !candidate.is_valid_at(at) {
        return Err(format!(
            "{} is not valid at {} (valid {} to {})",
            candidate.subject(),
            timestamp(at),
            timestamp(candidate.not_before()),
            timestamp(candidate.not_after())
        ));
    }
    child.verify_issued_by(candidate).map_err(|e| e.to_string())
}

fn check_validity_window(cert: &Certificate, at: DateTime<Utc>) -> TrustResult<()> {
    if at < cert.not_before() {
        return Err(TrustError::CertificateNotYetValid {
            subject: cert.subject().to_string(),
            not_before: timestamp(cert.not_before()),
            at: timestamp(at),
        });
    }
    if at > cert.not_after() {
        return Err(TrustError::CertificateExpired {
            subject: cert.subject().to_string(),
            not_after: timestamp(cert.not_after()),
            at: timestamp(at),
        });
    }
    Ok(())
}

fn check_domain(cert: &Certificate, expected: &str) -> TrustResult<()> {
    if cert.dns_names().iter().any(|name| name == expected) {
        return Ok(());
    }
    if cert.common_name() == Some(expected) {
        return Ok(());
    }

    let mut found = cert.dns_names().to_vec();
    if let Some(cn) = cert.common_name() {
        if !found.iter().any(|name| name == cn) {
            found.push(cn.to_string());
        }
    }
    Err(TrustError::DomainMismatch {
        expected: expected.to_string(),
        found,
    })
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
