// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw command packets decoded from hexadecimal configuration strings.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;

/// A non-empty byte sequence written verbatim to a serial port.
///
/// Packets are decoded once, when an entity is configured, from a string of
/// hex digit pairs. Whitespace between digits is ignored so that commands can
/// be written byte by byte.
///
/// # Examples
///
/// ```
/// use serial_send::types::CommandPacket;
///
/// let packet: CommandPacket = "A0 01 01 A2".parse().unwrap();
/// assert_eq!(packet.as_bytes(), &[0xA0, 0x01, 0x01, 0xA2]);
/// assert_eq!(packet.to_hex(), "A00101A2");
///
/// // Odd digit counts and non-hex characters are rejected
/// assert!("A0B".parse::<CommandPacket>().is_err());
/// assert!("ZZ".parse::<CommandPacket>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPacket(Arc<[u8]>);

impl CommandPacket {
    /// Decodes a packet from a hex string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHex`] for odd-length input or non-hex
    /// characters, and [`ConfigError::EmptyCommand`] when no digits remain.
    pub fn from_hex(value: &str) -> Result<Self, ConfigError> {
        let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        if digits.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }

        let bytes = hex::decode(&digits).map_err(|e| ConfigError::InvalidHex {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self(bytes.into()))
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the number of bytes in the packet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; packets hold at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the packet as upper-case hex without separators.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl FromStr for CommandPacket {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<&[u8]> for CommandPacket {
    type Error = ConfigError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.is_empty() {
            return Err(ConfigError::EmptyCommand);
        }
        Ok(Self(bytes.into()))
    }
}

impl fmt::Display for CommandPacket {
    /// Formats as space separated lower-case byte pairs, e.g. `a0 01 01 a2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_compact_hex() {
        let packet = CommandPacket::from_hex("A1B2").unwrap();
        assert_eq!(packet.as_bytes(), &[0xA1, 0xB2]);
        assert_eq!(packet.len(), 2);
    }

    #[test]
    fn decodes_lower_case_and_spaced_hex() {
        let packet = CommandPacket::from_hex(" a0 01\t01 a2 ").unwrap();
        assert_eq!(packet.as_bytes(), &[0xA0, 0x01, 0x01, 0xA2]);
    }

    #[test]
    fn round_trips_through_hex() {
        for input in ["00", "FF", "A00101A2", "0123456789ABCDEF", "DEADBEEF00"] {
            let packet = CommandPacket::from_hex(input).unwrap();
            assert_eq!(packet.to_hex(), input);
            assert_eq!(CommandPacket::from_hex(&packet.to_hex()).unwrap(), packet);
        }
    }

    #[test]
    fn rejects_odd_length() {
        let err = CommandPacket::from_hex("ABC").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHex { .. }));
    }

    #[test]
    fn rejects_non_hex_characters() {
        let err = CommandPacket::from_hex("A1G2").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHex { ref value, .. } if value == "A1G2"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            CommandPacket::from_hex(""),
            Err(ConfigError::EmptyCommand)
        ));
        assert!(matches!(
            CommandPacket::from_hex("   "),
            Err(ConfigError::EmptyCommand)
        ));
        assert!(matches!(
            CommandPacket::try_from(&[][..]),
            Err(ConfigError::EmptyCommand)
        ));
    }

    #[test]
    fn display_is_spaced_lower_case() {
        let packet: CommandPacket = "A00101A2".parse().unwrap();
        assert_eq!(packet.to_string(), "a0 01 01 a2");
    }
}
