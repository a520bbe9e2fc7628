// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover capability flags.

use crate::config::CoverConfig;

/// Commands a cover entity accepts.
///
/// # Examples
///
/// ```
/// use serial_send::entity::CoverFeatures;
///
/// let all = CoverFeatures::all();
/// assert!(all.supports_close());
/// assert_eq!(all.bits(), 0b1011);
///
/// let open_only = CoverFeatures::open_stop();
/// assert!(!open_only.supports_close());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoverFeatures {
    /// Accepts open.
    pub open: bool,
    /// Accepts close.
    pub close: bool,
    /// Accepts stop.
    pub stop: bool,
}

impl CoverFeatures {
    /// Bit for open in [`bits`](Self::bits).
    pub const OPEN: u32 = 1;
    /// Bit for close in [`bits`](Self::bits).
    pub const CLOSE: u32 = 2;
    /// Bit for stop in [`bits`](Self::bits).
    pub const STOP: u32 = 8;

    /// Open, close and stop.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            open: true,
            close: true,
            stop: true,
        }
    }

    /// Open and stop only.
    #[must_use]
    pub const fn open_stop() -> Self {
        Self {
            open: true,
            close: false,
            stop: true,
        }
    }

    /// Derives the features from a cover configuration.
    #[must_use]
    pub fn from_config(config: &CoverConfig) -> Self {
        if config.close.is_some() {
            Self::all()
        } else {
            Self::open_stop()
        }
    }

    /// Returns whether open is supported.
    #[must_use]
    pub const fn supports_open(&self) -> bool {
        self.open
    }

    /// Returns whether close is supported.
    #[must_use]
    pub const fn supports_close(&self) -> bool {
        self.close
    }

    /// Returns whether stop is supported.
    #[must_use]
    pub const fn supports_stop(&self) -> bool {
        self.stop
    }

    /// Encodes the flags as a bitmask, using the values home-automation hosts
    /// conventionally assign to cover features.
    #[must_use]
    pub const fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.open {
            bits |= Self::OPEN;
        }
        if self.close {
            bits |= Self::CLOSE;
        }
        if self.stop {
            bits |= Self::STOP;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PortConfig, PulseCommands};

    fn open_commands() -> PulseCommands {
        PulseCommands::new("AA".parse().unwrap(), "BB".parse().unwrap())
    }

    #[test]
    fn bits_encoding() {
        assert_eq!(CoverFeatures::all().bits(), 11);
        assert_eq!(CoverFeatures::open_stop().bits(), 9);
    }

    #[test]
    fn from_config_without_close() {
        let config = CoverConfig::new("Blind", PortConfig::new("/dev/ttyS0"), open_commands());
        assert_eq!(CoverFeatures::from_config(&config), CoverFeatures::open_stop());
    }

    #[test]
    fn from_config_with_close() {
        let close = PulseCommands::new("CC".parse().unwrap(), "DD".parse().unwrap());
        let config = CoverConfig::new("Blind", PortConfig::new("/dev/ttyS0"), open_commands())
            .with_close(close);
        assert_eq!(CoverFeatures::from_config(&config), CoverFeatures::all());
    }
}
