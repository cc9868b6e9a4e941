//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::{FmsPicError, Result};
use crate::fmspic::protocol::{FMSPIC_BAUD_RATE, FMSPIC_DEFAULT_AXIS_MAX};

/// Main configuration structure
///
/// Every section and field is optional; an empty file yields the defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

/// Virtual joystick configuration
#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_enabled")]
    pub enabled: bool,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_axis_max")]
    pub axis_max: u8,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file; console only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    #[serde(default = "default_summary_interval")]
    pub summary_interval: u64,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { FMSPIC_BAUD_RATE }
fn default_reconnect_interval_ms() -> u64 { 1000 }

fn default_input_enabled() -> bool { true }
fn default_device_name() -> String { "FMSPIC RC transmitter device".to_string() }
fn default_axis_max() -> u8 { FMSPIC_DEFAULT_AXIS_MAX }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_format() -> String { "jsonl".to_string() }

fn default_log_level() -> String { "info".to_string() }
fn default_summary_interval() -> u64 { 500 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            enabled: default_input_enabled(),
            device_name: default_device_name(),
            axis_max: default_axis_max(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            format: default_log_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            summary_interval: default_summary_interval(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> FmsPicError {
    FmsPicError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fmspic_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        // Only the "9600 F0" protocol is implemented; the 19200 "FF" variant is not.
        if self.serial.baud_rate != FMSPIC_BAUD_RATE {
            return Err(invalid(format!(
                "baud_rate must be {} (only the 9600 F0 protocol is supported)",
                FMSPIC_BAUD_RATE
            )));
        }

        if self.serial.reconnect_interval_ms == 0 || self.serial.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        if self.input.axis_max == 0 {
            return Err(invalid("axis_max must be between 1 and 255"));
        }

        if self.input.enabled && self.input.device_name.is_empty() {
            return Err(invalid("input device_name cannot be empty when enabled"));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging log_dir cannot be empty when set"));
        }

        if self.logging.summary_interval == 0 {
            return Err(invalid("summary_interval must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_file_equals_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert!(config.input.enabled);
        assert_eq!(config.input.axis_max, 0xF0);
        assert!(!config.telemetry.enabled);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyS1"

[input]
enabled = false

[telemetry]
enabled = true
log_dir = "/tmp/fmspic"
max_records_per_file = 50

[logging]
level = "debug"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert!(!config.input.enabled);
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.max_records_per_file, 50);
        assert_eq!(config.telemetry.max_files_to_keep, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
        let config = Config::load(path).unwrap();
        let defaults = Config::default();

        assert_eq!(config.serial.port, defaults.serial.port);
        assert_eq!(config.serial.baud_rate, defaults.serial.baud_rate);
        assert_eq!(config.serial.reconnect_interval_ms, defaults.serial.reconnect_interval_ms);
        assert_eq!(config.input.device_name, defaults.input.device_name);
        assert_eq!(config.input.axis_max, defaults.input.axis_max);
        assert_eq!(config.telemetry.enabled, defaults.telemetry.enabled);
        assert_eq!(config.logging.summary_interval, defaults.logging.summary_interval);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/fmspic.toml");
        assert!(matches!(result, Err(FmsPicError::Io(_))));
    }

    #[test]
    fn test_parse_malformed_toml() {
        let result = Config::parse("[serial\nport = ");
        assert!(matches!(result, Err(FmsPicError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 19200;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("9600"));
    }

    #[test]
    fn test_reconnect_interval_zero() {
        let mut config = Config::default();
        config.serial.reconnect_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reconnect_interval_too_high() {
        let mut config = Config::default();
        config.serial.reconnect_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_max_zero() {
        let mut config = Config::default();
        config.input.axis_max = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_max_out_of_range_rejected_by_parser() {
        let result = Config::parse("[input]\naxis_max = 300\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_device_name_when_enabled() {
        let mut config = Config::default();
        config.input.device_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_device_name_when_disabled() {
        let mut config = Config::default();
        config.input.enabled = false;
        config.input.device_name = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = Config::default();
        config.telemetry.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_files_to_keep_zero() {
        let mut config = Config::default();
        config.telemetry.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.telemetry.format = "csv".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = Config::default();
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "Level {} should be valid", level);
        }
    }

    #[test]
    fn test_empty_logging_dir() {
        let mut config = Config::default();
        config.logging.log_dir = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_interval_zero() {
        let mut config = Config::default();
        config.logging.summary_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 9600);
        assert_eq!(default_reconnect_interval_ms(), 1000);
        assert_eq!(default_input_enabled(), true);
        assert_eq!(default_device_name(), "FMSPIC RC transmitter device");
        assert_eq!(default_axis_max(), 0xF0);
        assert_eq!(default_telemetry_enabled(), false);
        assert_eq!(default_log_dir(), "./logs");
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
        assert_eq!(default_log_format(), "jsonl");
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_summary_interval(), 500);
    }
}
