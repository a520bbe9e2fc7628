// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light and cover entity configuration.

use std::time::Duration;

use serde::Deserialize;

use super::port_config::{PortConfig, SerialSchema};
use crate::error::ConfigError;
use crate::types::CommandPacket;

/// Name given to entities that do not configure one.
pub const DEFAULT_NAME: &str = "Serial Sensor";

/// Delay between the start and end pulses when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn required_packet(
    field: &'static str,
    value: Option<String>,
) -> Result<CommandPacket, ConfigError> {
    value.ok_or(ConfigError::MissingField(field))?.parse()
}

/// Raw light configuration as it appears in a configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct LightSchema {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Port keys.
    #[serde(flatten)]
    pub port: SerialSchema,
    /// Hex command that turns the light on.
    pub serial_cmd_turn_on: Option<String>,
    /// Hex command that turns the light off.
    pub serial_cmd_turn_off: Option<String>,
}

/// Validated configuration for a [`SerialLight`](crate::entity::SerialLight).
///
/// # Examples
///
/// ```
/// use serial_send::config::LightConfig;
///
/// let config = LightConfig::from_json(r#"{
///     "name": "Desk Lamp",
///     "serial_port": "/dev/ttyUSB0",
///     "serial_cmd_turn_on": "A0 01 01 A2",
///     "serial_cmd_turn_off": "A0 01 00 A1"
/// }"#).unwrap();
///
/// assert_eq!(config.name, "Desk Lamp");
/// assert_eq!(config.turn_on.to_hex(), "A00101A2");
/// assert_eq!(config.unique_id, "A00101A2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightConfig {
    /// Display name.
    pub name: String,
    /// Port the light's transmitter is attached to.
    pub port: PortConfig,
    /// Turn-on packet.
    pub turn_on: CommandPacket,
    /// Turn-off packet.
    pub turn_off: CommandPacket,
    /// Stable identifier: the turn-on command as written, whitespace removed.
    pub unique_id: String,
}

impl LightConfig {
    /// Creates a light configuration from already validated parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        port: PortConfig,
        turn_on: CommandPacket,
        turn_off: CommandPacket,
    ) -> Self {
        Self {
            name: name.into(),
            port,
            unique_id: turn_on.to_hex(),
            turn_on,
            turn_off,
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed, a required key
    /// is missing, or a command is not valid hex.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<LightSchema>(json)?.try_into()
    }

    /// Validates an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value::<LightSchema>(value)?.try_into()
    }
}

impl TryFrom<LightSchema> for LightConfig {
    type Error = ConfigError;

    fn try_from(schema: LightSchema) -> Result<Self, Self::Error> {
        let unique_id: String = schema
            .serial_cmd_turn_on
            .as_deref()
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let turn_on = required_packet("serial_cmd_turn_on", schema.serial_cmd_turn_on)?;
        let turn_off = required_packet("serial_cmd_turn_off", schema.serial_cmd_turn_off)?;
        let port = schema.port.into_port_config()?;

        Ok(Self {
            name: schema.name,
            port,
            turn_on,
            turn_off,
            unique_id,
        })
    }
}

/// Raw cover configuration as it appears in a configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverSchema {
    /// Display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Port keys.
    #[serde(flatten)]
    pub port: SerialSchema,
    /// Hex command that starts opening.
    pub serial_cmd_start_open: Option<String>,
    /// Hex command that ends opening.
    pub serial_cmd_end_open: Option<String>,
    /// Hex command that starts closing.
    pub serial_cmd_start_close: Option<String>,
    /// Hex command that ends closing.
    pub serial_cmd_end_close: Option<String>,
    /// Delay between start and end pulses, in milliseconds.
    pub serial_cmd_interval_ms: Option<u64>,
}

/// Start and end packets for one direction of travel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseCommands {
    /// Sent when the movement starts.
    pub start: CommandPacket,
    /// Sent when the movement ends or is stopped.
    pub end: CommandPacket,
}

impl PulseCommands {
    /// Pairs a start and an end packet.
    #[must_use]
    pub fn new(start: CommandPacket, end: CommandPacket) -> Self {
        Self { start, end }
    }
}

/// Validated configuration for a [`SerialCover`](crate::entity::SerialCover).
///
/// Closing is optional: it is available only when both close commands are
/// configured.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use serial_send::config::CoverConfig;
///
/// let config = CoverConfig::from_json(r#"{
///     "name": "Bedroom Blind",
///     "serial_port": "/dev/ttyUSB0",
///     "serial_cmd_start_open": "AA01",
///     "serial_cmd_end_open": "AA00",
///     "serial_cmd_start_close": "BB01",
///     "serial_cmd_end_close": "BB00",
///     "serial_cmd_interval_ms": 500
/// }"#).unwrap();
///
/// assert!(config.close.is_some());
/// assert_eq!(config.interval, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverConfig {
    /// Display name.
    pub name: String,
    /// Port the cover's transmitter is attached to.
    pub port: PortConfig,
    /// Opening pulse.
    pub open: PulseCommands,
    /// Closing pulse, if configured.
    pub close: Option<PulseCommands>,
    /// Delay between start and end packets.
    pub interval: Duration,
}

impl CoverConfig {
    /// Creates a cover that can only open, using the default interval.
    #[must_use]
    pub fn new(name: impl Into<String>, port: PortConfig, open: PulseCommands) -> Self {
        Self {
            name: name.into(),
            port,
            open,
            close: None,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Adds closing commands.
    #[must_use]
    pub fn with_close(mut self, close: PulseCommands) -> Self {
        self.close = Some(close);
        self
    }

    /// Sets the delay between start and end packets.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed, a required key
    /// is missing, only one of the close commands is set, the interval is
    /// zero, or a command is not valid hex.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<CoverSchema>(json)?.try_into()
    }

    /// Validates an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value::<CoverSchema>(value)?.try_into()
    }
}

impl TryFrom<CoverSchema> for CoverConfig {
    type Error = ConfigError;

    fn try_from(schema: CoverSchema) -> Result<Self, Self::Error> {
        let open = PulseCommands::new(
            required_packet("serial_cmd_start_open", schema.serial_cmd_start_open)?,
            required_packet("serial_cmd_end_open", schema.serial_cmd_end_open)?,
        );

        let close = match (schema.serial_cmd_start_close, schema.serial_cmd_end_close) {
            (None, None) => None,
            (Some(start), Some(end)) => Some(PulseCommands::new(start.parse()?, end.parse()?)),
            (Some(_), None) => return Err(ConfigError::MissingField("serial_cmd_end_close")),
            (None, Some(_)) => return Err(ConfigError::MissingField("serial_cmd_start_close")),
        };

        let interval = match schema.serial_cmd_interval_ms {
            None => DEFAULT_INTERVAL,
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    field: "serial_cmd_interval_ms",
                    message: "must be a positive integer".to_string(),
                });
            }
            Some(ms) => Duration::from_millis(ms),
        };

        let port = schema.port.into_port_config()?;

        Ok(Self {
            name: schema.name,
            port,
            open,
            close,
            interval,
        })
    }
}
