// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serial port configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{DataBits, Parity, StopBits};

/// Default baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Settings used to open a serial port.
///
/// A [`PortHandle`](crate::protocol::PortHandle) is identified by
/// [`path`](Self::path) alone. When several entities share a port, the
/// settings of the first one to acquire it are the ones applied.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use serial_send::config::PortConfig;
/// use serial_send::types::Parity;
///
/// let config = PortConfig::new("/dev/ttyUSB0")
///     .with_baud_rate(115_200)
///     .with_parity(Parity::Even)
///     .with_timeout(Duration::from_millis(200));
///
/// assert_eq!(config.path, "/dev/ttyUSB0");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
// Flow control flags are independent switches taken straight from configuration.
#[allow(clippy::struct_excessive_bools)]
pub struct PortConfig {
    /// OS path of the serial device (e.g. `/dev/ttyUSB0` or `COM3`).
    pub path: String,
    /// Line speed.
    pub baud_rate: u32,
    /// Character size.
    pub data_bits: DataBits,
    /// Parity mode.
    pub parity: Parity,
    /// Stop bits.
    pub stop_bits: StopBits,
    /// Software (XON/XOFF) flow control.
    pub xonxoff: bool,
    /// Hardware (RTS/CTS) flow control.
    pub rtscts: bool,
    /// Write timeout; the backend default applies when `None`.
    pub timeout: Option<Duration>,
}

impl PortConfig {
    /// Creates a configuration with 9600 baud, 8N1 and no flow control.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            xonxoff: false,
            rtscts: false,
            timeout: None,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Sets the character size.
    #[must_use]
    pub fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Sets the parity mode.
    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Sets the stop bits.
    #[must_use]
    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Enables software flow control.
    #[must_use]
    pub fn with_xonxoff(mut self) -> Self {
        self.xonxoff = true;
        self
    }

    /// Enables hardware flow control.
    #[must_use]
    pub fn with_rtscts(mut self) -> Self {
        self.rtscts = true;
        self
    }

    /// Sets the write timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks that the serial backend can apply these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty path or a zero baud
    /// rate, and [`ConfigError::Unsupported`] for 1.5 stop bits, mark/space
    /// parity, or both flow control modes at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "serial_port",
                message: "port path must not be empty".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "baudrate",
                message: "must be a positive integer".to_string(),
            });
        }
        if self.stop_bits == StopBits::OnePointFive {
            return Err(ConfigError::Unsupported("1.5 stop bits".to_string()));
        }
        if matches!(self.parity, Parity::Mark | Parity::Space) {
            return Err(ConfigError::Unsupported(format!(
                "parity {}",
                self.parity
            )));
        }
        if self.xonxoff && self.rtscts {
            return Err(ConfigError::Unsupported(
                "xonxoff and rtscts enabled together".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if any setting other than the path differs from `other`.
    #[must_use]
    pub fn settings_differ(&self, other: &Self) -> bool {
        Self {
            path: other.path.clone(),
            ..self.clone()
        } != *other
    }
}

/// Port keys shared by every entity schema.
///
/// Field names match the configuration keys. Use
/// [`into_port_config`](Self::into_port_config) to obtain a validated
/// [`PortConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct SerialSchema {
    /// Required port path.
    pub serial_port: Option<String>,
    /// Baud rate.
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
    /// Byte size in bits.
    #[serde(default = "default_bytesize")]
    pub bytesize: u8,
    /// Parity letter.
    #[serde(default = "default_parity")]
    pub parity: String,
    /// Stop bits.
    #[serde(default = "default_stopbits")]
    pub stopbits: f64,
    /// Software flow control.
    #[serde(default)]
    pub xonxoff: bool,
    /// Hardware flow control.
    #[serde(default)]
    pub rtscts: bool,
    /// Write timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl SerialSchema {
    /// Converts the raw keys into a validated [`PortConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `serial_port` is missing or any value is
    /// invalid or unsupported.
    pub fn into_port_config(self) -> Result<PortConfig, ConfigError> {
        let path = self
            .serial_port
            .ok_or(ConfigError::MissingField("serial_port"))?;

        let config = PortConfig {
            path,
            baud_rate: self.baudrate,
            data_bits: DataBits::try_from(self.bytesize)?,
            parity: self.parity.parse()?,
            stop_bits: StopBits::try_from(self.stopbits)?,
            xonxoff: self.xonxoff,
            rtscts: self.rtscts,
            timeout: self.timeout_ms.map(Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_baudrate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_bytesize() -> u8 {
    8
}

fn default_parity() -> String {
    "N".to_string()
}

fn default_stopbits() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(json: serde_json::Value) -> SerialSchema {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn defaults_are_9600_8n1() {
        let config = PortConfig::new("/dev/ttyUSB0");

        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert!(!config.xonxoff);
        assert!(!config.rtscts);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn schema_applies_defaults() {
        let config = schema(serde_json::json!({ "serial_port": "/dev/ttyS0" }))
            .into_port_config()
            .unwrap();

        assert_eq!(config, PortConfig::new("/dev/ttyS0"));
    }

    #[test]
    fn schema_reads_all_keys() {
        let config = schema(serde_json::json!({
            "serial_port": "COM3",
            "baudrate": 19200,
            "bytesize": 7,
            "parity": "E",
            "stopbits": 2,
            "rtscts": true,
            "timeout_ms": 250
        }))
        .into_port_config()
        .unwrap();

        assert_eq!(config.path, "COM3");
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.data_bits, DataBits::Seven);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert!(config.rtscts);
        assert_eq!(config.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn schema_requires_serial_port() {
        let err = schema(serde_json::json!({ "baudrate": 9600 }))
            .into_port_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("serial_port")));
    }

    #[test]
    fn schema_rejects_bad_bytesize() {
        let err = schema(serde_json::json!({ "serial_port": "/dev/ttyS0", "bytesize": 9 }))
            .into_port_config()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "bytesize",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_unsupported_settings() {
        let base = PortConfig::new("/dev/ttyS0");

        assert!(matches!(
            base.clone().with_stop_bits(StopBits::OnePointFive).validate(),
            Err(ConfigError::Unsupported(_))
        ));
        assert!(matches!(
            base.clone().with_parity(Parity::Mark).validate(),
            Err(ConfigError::Unsupported(_))
        ));
        assert!(matches!(
            base.clone().with_xonxoff().with_rtscts().validate(),
            Err(ConfigError::Unsupported(_))
        ));
        assert!(matches!(
            base.with_baud_rate(0).validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn settings_differ_ignores_path() {
        let a = PortConfig::new("/dev/ttyS0");
        let b = PortConfig::new("/dev/ttyS1");
        let c = PortConfig::new("/dev/ttyS0").with_baud_rate(115_200);

        assert!(!a.settings_differ(&b));
        assert!(a.settings_differ(&c));
    }
}
