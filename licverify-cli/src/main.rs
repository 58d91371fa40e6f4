//! Offline license verification for a deployed instance.
//!
//! Validates the instance's signing certificate against ISRG Root X1 and then
//! the license file against that certificate. Paths and the instance ID fall
//! back to the environment and then to the standard `/var/subscription`
//! locations.
//!
//! Usage:
//!   licverify --organization-id org-123 --product-plan-id plan-456
//!
//! Exits 0 when the license is valid, 1 otherwise.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use licverify_license::config::DEFAULT_CERTIFICATE_DOMAIN;
use licverify_license::timestamp::parse_timestamp;
use licverify_license::{ValidationOptions, ValidatorConfig, validate_license_with_config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "licverify")]
#[command(about = "Verify a signed license offline")]
struct Args {
    /// Signing certificate (PEM chain, end-entity first)
    #[arg(long)]
    cert: Option<PathBuf>,

    /// License file (JSON envelope or its base64 encoding)
    #[arg(long)]
    license: Option<PathBuf>,

    /// Instance ID the license must be bound to
    #[arg(long)]
    instance_id: Option<String>,

    /// Organization ID the license must be issued to
    #[arg(long)]
    organization_id: Option<String>,

    /// Product plan ID (or SKU) the license must be issued for
    #[arg(long)]
    product_plan_id: Option<String>,

    /// Domain the signing certificate must be issued for
    #[arg(long, default_value = DEFAULT_CERTIFICATE_DOMAIN)]
    domain: String,

    /// Trust the signing certificate without chain or domain checks
    #[arg(long)]
    skip_certificate_validation: bool,

    /// Evaluate at this RFC 3339 instant instead of now
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> ValidationOptions {
        ValidationOptions {
            skip_certificate_validation: self.skip_certificate_validation,
            certificate_domain: self.domain.clone(),
            current_time: self.at,
            cert_path: self.cert.clone(),
            license_path: self.license.clone(),
            organization_id: self.organization_id.clone(),
            product_plan_id: self.product_plan_id.clone(),
            instance_id: self.instance_id.clone(),
        }
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

fn run(args: &Args) -> Result<()> {
    let options = args.options();
    let config = ValidatorConfig::from_options(&options);
    debug!(
        cert = %config.cert_path().display(),
        license = %config.license_path().display(),
        instance_id = %config.instance_id(),
        "Resolved configuration"
    );

    validate_license_with_config(&options, &config)
        .with_context(|| format!("license {} is not valid", config.license_path().display()))
}

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    match run(&args) {
        Ok(()) => {
            info!("License verified");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
