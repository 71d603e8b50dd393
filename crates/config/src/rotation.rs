//! Rotation configuration
//!
//! Raw values for the rotating sink. Numeric values are passed through as
//! written; the sink clamps them.

use serde::Deserialize;

/// Default active log file
pub const DEFAULT_LOG_FILE_NAME: &str = "try.log";

/// The only supported rotation mode
pub const MIDNIGHT: &str = "MIDNIGHT";

/// Rotation configuration
///
/// # Example
///
/// ```toml
/// [rotation]
/// when = "MIDNIGHT"
/// rotate_size = 1
/// log_file_name = "try.log"
/// max_file_number_per_day = 3
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Time-based rotation mode
    /// Default: MIDNIGHT
    pub when: String,

    /// Size threshold in MB, `<= 0` for unlimited
    /// Default: 0
    pub rotate_size: i64,

    /// Active log file, relative to the working directory or absolute
    /// Default: try.log
    pub log_file_name: String,

    /// Files (active + archived) kept per day, out of range means 1000
    /// Default: 1000
    pub max_file_number_per_day: i64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            when: MIDNIGHT.to_string(),
            rotate_size: 0,
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            max_file_number_per_day: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RotationConfig::default();
        assert_eq!(config.when, "MIDNIGHT");
        assert_eq!(config.rotate_size, 0);
        assert_eq!(config.log_file_name, "try.log");
        assert_eq!(config.max_file_number_per_day, 1000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RotationConfig = toml::from_str("rotate_size = 5").unwrap();
        assert_eq!(config.rotate_size, 5);
        assert_eq!(config.when, "MIDNIGHT");
        assert_eq!(config.log_file_name, "try.log");
    }

    #[test]
    fn test_deserialize_negative_values_pass_through() {
        let toml = r#"
rotate_size = -1
max_file_number_per_day = -5
"#;
        let config: RotationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.rotate_size, -1);
        assert_eq!(config.max_file_number_per_day, -5);
    }
}
