//! Configuration validation

use super::ProbeConfig;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &ProbeConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if config.scope.is_empty() {
        result.error("scope: must not be empty");
    }
    // ';' separates endpoint identifier components
    if config.scope.contains(';') {
        result.error(format!("scope: must not contain ';': {}", config.scope));
    }

    if config.conntrack.debug_sample > 1000 {
        result.warn(format!(
            "conntrack.debug_sample: {} flows per pass will be noisy",
            config.conntrack.debug_sample
        ));
    }

    match config.log.format.as_str() {
        "pretty" | "compact" | "json" => {}
        other => result.warn(format!("log.format: unknown format {other:?}, using pretty")),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scope: &str) -> ProbeConfig {
        toml::from_str(&format!(r#"scope = "{scope}""#)).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let result = validate(&config("host1"));
        assert!(!result.has_errors());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_scope_rejected() {
        assert!(validate(&config("")).has_errors());
    }

    #[test]
    fn test_scope_with_separator_rejected() {
        assert!(validate(&config("host;1")).has_errors());
    }

    #[test]
    fn test_unknown_log_format_warns() {
        let mut cfg = config("host1");
        cfg.log.format = "xml".to_string();
        let result = validate(&cfg);
        assert!(!result.has_errors());
        assert_eq!(result.warnings.len(), 1);
    }
}
