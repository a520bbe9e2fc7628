// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serial line settings.
//!
//! These mirror the values accepted in configuration files: byte size as a
//! number of bits, parity as a single letter, and stop bits as a number.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Number of data bits per character.
///
/// # Examples
///
/// ```
/// use serial_send::types::DataBits;
///
/// assert_eq!(DataBits::try_from(7).unwrap(), DataBits::Seven);
/// assert!(DataBits::try_from(9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataBits {
    /// 5 bits.
    Five,
    /// 6 bits.
    Six,
    /// 7 bits.
    Seven,
    /// 8 bits.
    #[default]
    Eight,
}

impl DataBits {
    /// Returns the number of bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(ConfigError::InvalidValue {
                field: "bytesize",
                message: format!("{other} is not one of 5, 6, 7, 8"),
            }),
        }
    }
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Even parity.
    Even,
    /// Odd parity.
    Odd,
    /// Parity bit always 1.
    Mark,
    /// Parity bit always 0.
    Space,
}

impl Parity {
    /// Returns the single-letter configuration code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "N",
            Self::Even => "E",
            Self::Odd => "O",
            Self::Mark => "M",
            Self::Space => "S",
        }
    }
}

impl FromStr for Parity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "N" | "NONE" => Ok(Self::None),
            "E" | "EVEN" => Ok(Self::Even),
            "O" | "ODD" => Ok(Self::Odd),
            "M" | "MARK" => Ok(Self::Mark),
            "S" | "SPACE" => Ok(Self::Space),
            _ => Err(ConfigError::InvalidValue {
                field: "parity",
                message: format!("{s:?} is not one of N, E, O, M, S"),
            }),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopBits {
    /// One stop bit.
    #[default]
    One,
    /// One and a half stop bits.
    OnePointFive,
    /// Two stop bits.
    Two,
}

impl StopBits {
    /// Returns the configuration spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::OnePointFive => "1.5",
            Self::Two => "2",
        }
    }
}

impl TryFrom<f64> for StopBits {
    type Error = ConfigError;

    // Configuration values are exact literals, so direct comparison is fine.
    #[allow(clippy::float_cmp)]
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(Self::One)
        } else if value == 1.5 {
            Ok(Self::OnePointFive)
        } else if value == 2.0 {
            Ok(Self::Two)
        } else {
            Err(ConfigError::InvalidValue {
                field: "stopbits",
                message: format!("{value} is not one of 1, 1.5, 2"),
            })
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
