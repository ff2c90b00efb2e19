//! # Verify Subcommand
//!
//! Checks a bundle string against its embedded public key. The argument is
//! either a path to a file holding the bundle or the bundle string itself.
//!
//! Exit codes: `0` signature valid and MRZ consistent, `1` otherwise.
//! Unreadable or malformed bundles are errors.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use spl_bundle::{inspect, Bundle};

/// Arguments for `spl verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Bundle file, or the base64 bundle string itself.
    #[arg(value_name = "BUNDLE")]
    pub bundle: String,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute `spl verify`. Returns the process exit code.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let encoded = read_bundle_arg(&args.bundle)?;
    let bundle = Bundle::from_base64(&encoded).context("failed to decode bundle")?;
    let report = inspect(&bundle).context("failed to verify bundle")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let status = if report.is_ok() { "OK" } else { "FAIL" };
        println!("{status}: {}", report.document_number);
        println!("  Signature valid: {}", report.signature_valid);
        println!("  MRZ consistent:  {}", report.mrz_consistent);
        println!("  Payload SHA-256: {}", report.payload_digest);
        println!("  Key fingerprint: {}", report.key_fingerprint);
    }

    tracing::debug!(
        document_number = %report.document_number,
        signature_valid = report.signature_valid,
        "verified bundle"
    );
    Ok(if report.is_ok() { 0 } else { 1 })
}

fn read_bundle_arg(arg: &str) -> Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bundle file: {}", path.display()))?;
        Ok(text.trim().to_string())
    } else {
        Ok(arg.trim().to_string())
    }
}
