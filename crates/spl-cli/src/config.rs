//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`. Every key has a default:
//!
//! ```yaml
//! issuer:
//!   name: Republic of Sampleland
//!   code: XAA
//!   disclaimer: FICTIONAL DOCUMENT NO LEGAL VALUE
//! style:
//!   kind: guilloche
//!   density: dense
//! filler_pages: 6
//! qr_level: medium
//! output_dir: out
//! ```
//!
//! A relative `output_dir` is resolved against the directory holding the
//! configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spl_issuer::IssuerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub issuance: IssuerConfig,
    pub output_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        if let (Some(dir), Some(base)) = (config.output_dir.as_ref(), path.parent()) {
            config.output_dir = Some(crate::resolve_path(dir, base));
        }
        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config)
    }
}
