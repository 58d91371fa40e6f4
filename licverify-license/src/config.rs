//! File-based validation for deployed instances.
//!
//! A deployed instance finds its signing certificate and license file at
//! well-known paths, overridable by environment variables or explicitly:
//!
//! | Setting        | Environment variable                            | Default                          |
//! |----------------|-------------------------------------------------|----------------------------------|
//! | certificate    | `SERVICE_PLAN_SUBSCRIPTION_LICENSE_CERT_PATH`   | `/var/subscription/license.crt`  |
//! | license        | `SERVICE_PLAN_SUBSCRIPTION_LICENSE_FILE_PATH`   | `/var/subscription/license.lic`  |
//! | instance ID    | `INSTANCE_ID`                                   | empty (match any)                |
//!
//! Precedence is explicit value, then environment, then default. Empty
//! strings count as unset at every level.

use crate::envelope::LicenseEnvelope;
use crate::error::{LicenseError, LicenseResult};
use crate::validator::{ExpectedLicense, Validator};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Domain the signing certificate must be issued for.
pub const DEFAULT_CERTIFICATE_DOMAIN: &str = "licensing.omnistrate.cloud";

pub const DEFAULT_CERT_PATH: &str = "/var/subscription/license.crt";
pub const DEFAULT_LICENSE_PATH: &str = "/var/subscription/license.lic";

pub const INSTANCE_ID_ENV: &str = "INSTANCE_ID";
pub const CERT_PATH_ENV: &str = "SERVICE_PLAN_SUBSCRIPTION_LICENSE_CERT_PATH";
pub const LICENSE_PATH_ENV: &str = "SERVICE_PLAN_SUBSCRIPTION_LICENSE_FILE_PATH";

/// Resolved file locations and instance identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    instance_id: String,
    cert_path: PathBuf,
    license_path: PathBuf,
}

impl ValidatorConfig {
    /// Resolves against the process environment.
    #[must_use]
    pub fn resolve(
        instance_id: Option<&str>,
        cert_path: Option<&Path>,
        license_path: Option<&Path>,
    ) -> Self {
        Self::resolve_with(instance_id, cert_path, license_path, |name| {
            std::env::var(name).ok()
        })
    }

    /// Resolves against a caller-supplied environment lookup.
    #[must_use]
    pub fn resolve_with<F>(
        instance_id: Option<&str>,
        cert_path: Option<&Path>,
        license_path: Option<&Path>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| env(name).filter(|value| !value.is_empty());
        let explicit_path = |path: Option<&Path>| {
            path.filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
        };

        Self {
            instance_id: instance_id
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .or_else(|| from_env(INSTANCE_ID_ENV))
                .unwrap_or_default(),
            cert_path: explicit_path(cert_path)
                .or_else(|| from_env(CERT_PATH_ENV).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CERT_PATH)),
            license_path: explicit_path(license_path)
                .or_else(|| from_env(LICENSE_PATH_ENV).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LICENSE_PATH)),
        }
    }

    /// Resolves the paths and instance ID named in `options`.
    #[must_use]
    pub fn from_options(options: &ValidationOptions) -> Self {
        Self::resolve(
            options.instance_id.as_deref(),
            options.cert_path.as_deref(),
            options.license_path.as_deref(),
        )
    }

    /// Instance ID the license must be bound to; empty matches any.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    #[must_use]
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    #[must_use]
    pub fn license_path(&self) -> &Path {
        &self.license_path
    }
}

/// Inputs to [`validate_license_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Skip chain and domain validation of the signing certificate.
    pub skip_certificate_validation: bool,
    /// Domain the signing certificate must be bound to.
    pub certificate_domain: String,
    /// Evaluation instant; the system clock when `None`.
    pub current_time: Option<DateTime<Utc>>,
    /// Certificate chain file; resolved through [`ValidatorConfig`] when `None`.
    pub cert_path: Option<PathBuf>,
    /// License file; resolved through [`ValidatorConfig`] when `None`.
    pub license_path: Option<PathBuf>,
    /// Expected organization ID; any organization when `None` or empty.
    pub organization_id: Option<String>,
    /// Expected product plan ID; any plan when `None` or empty.
    pub product_plan_id: Option<String>,
    /// Instance ID override; falls back to `INSTANCE_ID` when `None`.
    pub instance_id: Option<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            skip_certificate_validation: false,
            certificate_domain: DEFAULT_CERTIFICATE_DOMAIN.to_string(),
            current_time: None,
            cert_path: None,
            license_path: None,
            organization_id: None,
            product_plan_id: None,
            instance_id: None,
        }
    }
}

impl ValidationOptions {
    /// Rejects option combinations that cannot validate anything.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Config`] if certificate validation is enabled
    /// with an empty certificate domain.
    pub fn check(&self) -> LicenseResult<()> {
        if !self.skip_certificate_validation && self.certificate_domain.trim().is_empty() {
            return Err(LicenseError::Config(
                "certificate domain is required unless certificate validation is skipped"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Validates the license file of this instance for an organization and
/// product plan, with every other option at its default.
///
/// # Errors
///
/// As [`validate_license_with_options`].
pub fn validate_license_for(organization_id: &str, product_plan_id: &str) -> LicenseResult<()> {
    validate_license_with_options(&ValidationOptions {
        organization_id: Some(organization_id.to_string()),
        product_plan_id: Some(product_plan_id.to_string()),
        ..ValidationOptions::default()
    })
}

/// Validates the configured license file end to end.
///
/// # Errors
///
/// [`LicenseError::Config`] for bad options, [`LicenseError::Io`] for
/// unreadable files, and any certificate or license validation failure.
pub fn validate_license_with_options(options: &ValidationOptions) -> LicenseResult<()> {
    validate_license_with_config(options, &ValidatorConfig::from_options(options))
}

/// Validates using an already-resolved configuration.
///
/// The instance ID expected in the license is `config.instance_id()`.
///
/// # Errors
///
/// As [`validate_license_with_options`].
pub fn validate_license_with_config(
    options: &ValidationOptions,
    config: &ValidatorConfig,
) -> LicenseResult<()> {
    options.check()?;

    let pem = read_file(config.cert_path())?;
    let validator = Validator::from_pem(&pem)?;
    let at = options.current_time.unwrap_or_else(Utc::now);

    if options.skip_certificate_validation {
        warn!(cert = %config.cert_path().display(), "Certificate validation skipped");
    } else {
        let chain = validator.validate_certificate(&options.certificate_domain, at)?;
        debug!(
            domain = %options.certificate_domain,
            depth = chain.len(),
            "Signing certificate trusted"
        );
    }

    let envelope = read_envelope(config.license_path())?;
    let expected = ExpectedLicense {
        organization_id: options.organization_id.as_deref(),
        product_plan_id: options.product_plan_id.as_deref(),
        instance_id: Some(config.instance_id()),
    };
    validator.validate_license(&envelope, &expected, at)?;

    info!(
        license = %config.license_path().display(),
        instance_id = %config.instance_id(),
        "License valid"
    );
    Ok(())
}

fn read_file(path: &Path) -> LicenseResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| LicenseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// License files hold either the JSON envelope or its base64 encoding.
fn read_envelope(path: &Path) -> LicenseResult<LicenseEnvelope> {
    let contents = read_file(path)?;
    let trimmed = contents.trim_ascii();
    if trimmed.starts_with(b"{") {
        return LicenseEnvelope::parse_bytes(trimmed);
    }
    let text = std::str::from_utf8(trimmed)
        .map_err(|_| LicenseError::InvalidEnvelope("license file is not UTF-8".to_string()))?;
    LicenseEnvelope::parse_base64(text)
}
