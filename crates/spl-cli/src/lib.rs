//! # spl-cli: Sampleland Credential CLI
//!
//! ## Subcommands
//!
//! - `spl issue`: issue a credential from a photo and optional request JSON,
//!   writing the PDF and the bundle string to the output directory.
//! - `spl verify`: check a bundle string (inline or from a file) and print
//!   a verification report.
//!
//! ```bash
//! spl --config issuer.yaml issue --photo face.png --request subject.json
//! spl verify out/fictional-passport-SPL-004211.bundle.txt
//! ```

pub mod config;
pub mod issue;
pub mod verify;

use std::path::{Path, PathBuf};

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
