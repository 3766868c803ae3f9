//! Configuration types

use serde::Deserialize;

use crate::telemetry::LogConfig;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Report scope: the observation domain all endpoint identifiers are
    /// qualified with (typically the host or cluster name).
    pub scope: String,
    #[serde(default)]
    pub conntrack: ConntrackConfig,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConntrackConfig {
    /// Whether the NAT reconciliation pass runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// How many flows per pass are logged at debug level.
    #[serde(default = "default_debug_sample")]
    pub debug_sample: u32,
}

impl Default for ConntrackConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            debug_sample: default_debug_sample(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl From<LogSection> for LogConfig {
    fn from(section: LogSection) -> Self {
        Self {
            level: section.level,
            format: section.format,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_debug_sample() -> u32 {
    crate::nat::DEFAULT_DEBUG_SAMPLE
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: ProbeConfig = toml::from_str(r#"scope = "host1""#).unwrap();
        assert_eq!(config.scope, "host1");
        assert!(config.conntrack.enabled);
        assert_eq!(config.conntrack.debug_sample, 5);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_full_config() {
        let config: ProbeConfig = toml::from_str(
            r#"
            scope = "cluster-a"

            [conntrack]
            enabled = false
            debug_sample = 0

            [log]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        assert!(!config.conntrack.enabled);
        assert_eq!(config.conntrack.debug_sample, 0);
        assert_eq!(config.log.format, "json");
    }
}
