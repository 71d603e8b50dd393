//! Configuration validation
//!
//! Validates values the sink would reject at startup:
//! - Rotation mode is `MIDNIGHT`
//! - Log file name is present

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::rotation::MIDNIGHT;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_rotation(config)?;
    Ok(())
}

fn validate_rotation(config: &Config) -> Result<()> {
    let rotation = &config.rotation;

    if rotation.when != MIDNIGHT {
        return Err(ConfigError::invalid_value(
            "rotation",
            &rotation.log_file_name,
            "when",
            format!("'{}' is not supported, only '{MIDNIGHT}'", rotation.when),
        ));
    }

    if rotation.log_file_name.trim().is_empty() {
        return Err(ConfigError::missing_field(
            "rotation",
            "rotation",
            "log_file_name",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_unsupported_mode() {
        let mut config = Config::default();
        config.rotation.when = "HOURLY".into();

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "when", .. }));
        assert!(err.to_string().contains("HOURLY"));
    }

    #[test]
    fn test_mode_is_case_sensitive() {
        let mut config = Config::default();
        config.rotation.when = "midnight".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_file_name() {
        let mut config = Config::default();
        config.rotation.log_file_name = "  ".into();

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                field: "log_file_name",
                ..
            }
        ));
    }

    #[test]
    fn test_out_of_range_numbers_are_not_errors() {
        let mut config = Config::default();
        config.rotation.rotate_size = -3;
        config.rotation.max_file_number_per_day = 5000;
        assert!(validate_config(&config).is_ok());
    }
}
