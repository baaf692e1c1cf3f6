//! Configuration validation
//!
//! Validates configuration and reports issues.

use super::types::Config;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }

    /// Errors as one message, if any
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::valid();

    if config.model.max_attempts == 0 {
        result = result.with_error(ValidationIssue::new(
            "model.max_attempts",
            "must be at least 1",
        ));
    }
    if config.model.timeout_secs == 0 {
        result = result.with_error(ValidationIssue::new(
            "model.timeout_secs",
            "must be at least 1",
        ));
    }
    if let Some(temperature) = config.model.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            result = result.with_warning(ValidationIssue::new(
                "model.temperature",
                format!("{} is outside the usual 0.0-2.0 range", temperature),
            ));
        }
    }

    if config.server.command.trim().is_empty() {
        result = result.with_error(ValidationIssue::new("server.command", "must not be empty"));
    }

    if config.tools.max_iterations == 0 {
        result = result.with_error(ValidationIssue::new(
            "tools.max_iterations",
            "must be at least 1",
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&Config::default());
        assert!(result.valid);
        assert!(result.error_message().is_none());
    }

    #[test]
    fn test_zero_limits_are_errors() {
        let mut config = Config::default();
        config.model.max_attempts = 0;
        config.tools.max_iterations = 0;
        let result = validate_config(&config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .error_message()
            .unwrap()
            .contains("model.max_attempts: must be at least 1"));
    }

    #[test]
    fn test_temperature_warning() {
        let mut config = Config::default();
        config.model.temperature = Some(7.5);
        let result = validate_config(&config);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_raising_listing_tool_is_accepted_silently() {
        let mut config = Config::default();
        config.tools.raise_on_error = vec!["directory_tree".to_string()];
        let result = validate_config(&config);
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }
}
