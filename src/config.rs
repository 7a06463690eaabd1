//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LinkError, Result};

/// Baud rates accepted for the radio link
pub const SUPPORTED_BAUD_RATES: [u32; 8] = [9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub link: LinkConfig,

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

    /// Wait for a single byte before re-checking the response deadline
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

/// Link protocol configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    #[serde(default = "default_protocol_version")]
    pub protocol_version: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rotated log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// JSON-lines frame journal
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_read_timeout_ms() -> u64 { 300 }
fn default_write_timeout_ms() -> u64 { 500 }

fn default_response_timeout_ms() -> u64 { 1000 }
fn default_protocol_version() -> u8 { crate::protocol::constants::PROTOCOL_VER }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: default_response_timeout_ms(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            journal_path: None,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl LinkConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
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
    /// use amon_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
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

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {}",
                SUPPORTED_BAUD_RATES
                    .iter()
                    .map(|rate| rate.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        if self.link.response_timeout_ms == 0 || self.link.response_timeout_ms > 10000 {
            return Err(invalid("response_timeout_ms must be between 1 and 10000"));
        }

        // The per-byte wait must leave room to re-check the deadline
        if self.serial.read_timeout_ms == 0 || self.serial.read_timeout_ms > self.link.response_timeout_ms {
            return Err(invalid("read_timeout_ms must be between 1 and response_timeout_ms"));
        }

        if self.serial.write_timeout_ms == 0 || self.serial.write_timeout_ms > 10000 {
            return Err(invalid("write_timeout_ms must be between 1 and 10000"));
        }

        if self.link.protocol_version == 0 {
            return Err(invalid("protocol_version must be greater than 0"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> LinkError {
    LinkError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.read_timeout(), Duration::from_millis(300));
        assert_eq!(config.link.response_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyACM1"
baud_rate = 921600

[link]
response_timeout_ms = 2000

[logging]
level = "debug"
journal_path = "frames.jsonl"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.serial.baud_rate, 921600);
        assert_eq!(config.serial.write_timeout_ms, 500);
        assert_eq!(config.link.response_timeout_ms, 2000);
        assert_eq!(config.logging.journal_path, Some(PathBuf::from("frames.jsonl")));
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.link.protocol_version, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/amon-link.toml");
        assert!(matches!(result, Err(LinkError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[serial\nport = 3");
        assert!(matches!(result, Err(LinkError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in SUPPORTED_BAUD_RATES.iter() {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_response_timeout_bounds() {
        let mut config = Config::default();
        config.link.response_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.link.response_timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_timeout_must_fit_in_response_timeout() {
        let mut config = Config::default();
        config.serial.read_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.serial.read_timeout_ms = config.link.response_timeout_ms + 1;
        assert!(config.validate().is_err());

        config.serial.read_timeout_ms = config.link.response_timeout_ms;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_write_timeout_bounds() {
        let mut config = Config::default();
        config.serial.write_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.serial.write_timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_protocol_version_zero() {
        let mut config = Config::default();
        config.link.protocol_version = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "/dev/ttyUSB0");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_read_timeout_ms(), 300);
        assert_eq!(default_write_timeout_ms(), 500);
        assert_eq!(default_response_timeout_ms(), 1000);
        assert_eq!(default_protocol_version(), 1);
        assert_eq!(default_log_level(), "info");
    }
}
