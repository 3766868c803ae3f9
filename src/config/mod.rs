//! Configuration management
//!
//! Handles the probe's config.toml: the report scope and the settings of
//! the NAT reconciliation pass.

mod types;
mod validation;

pub use types::*;
pub use validation::{validate, ValidationResult};

use crate::{Error, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<ProbeConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let config: ProbeConfig =
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
    Ok(config)
}
