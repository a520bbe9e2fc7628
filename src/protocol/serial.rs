// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OS serial ports via the `serialport` crate.

use std::io::{self, Write};
use std::time::Duration;

use crate::config::PortConfig;
use crate::protocol::{PortOpener, SerialLink};
use crate::types::{DataBits, Parity, StopBits};

/// Write timeout applied when the configuration does not set one.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Opens real serial devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPortOpener;

impl PortOpener for SystemPortOpener {
    fn open(&self, config: &PortConfig) -> io::Result<Box<dyn SerialLink>> {
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity)?)
            .stop_bits(stop_bits(config.stop_bits)?)
            .flow_control(flow_control(config))
            .timeout(config.timeout.unwrap_or(DEFAULT_WRITE_TIMEOUT))
            .open()?;

        Ok(Box::new(port))
    }
}

impl SerialLink for Box<dyn serialport::SerialPort> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        Write::write(self, bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

// Mark/space parity and 1.5 stop bits are rejected by `PortConfig::validate`;
// these errors only fire for configs built without validation.
fn parity(parity: Parity) -> io::Result<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Mark | Parity::Space => Err(unsupported(&format!("parity {parity}"))),
    }
}

fn stop_bits(stop_bits: StopBits) -> io::Result<serialport::StopBits> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(unsupported("1.5 stop bits")),
    }
}

fn flow_control(config: &PortConfig) -> serialport::FlowControl {
    if config.rtscts {
        serialport::FlowControl::Hardware
    } else if config.xonxoff {
        serialport::FlowControl::Software
    } else {
        serialport::FlowControl::None
    }
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("unsupported setting: {what}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_flow_control() {
        let base = PortConfig::new("/dev/ttyS0");
        assert_eq!(flow_control(&base), serialport::FlowControl::None);
        assert_eq!(
            flow_control(&base.clone().with_xonxoff()),
            serialport::FlowControl::Software
        );
        assert_eq!(
            flow_control(&base.with_rtscts()),
            serialport::FlowControl::Hardware
        );
    }

    #[test]
    fn rejects_settings_the_backend_lacks() {
        assert!(parity(Parity::Mark).is_err());
        assert!(stop_bits(StopBits::OnePointFive).is_err());
        assert_eq!(parity(Parity::Even).unwrap(), serialport::Parity::Even);
        assert_eq!(data_bits(DataBits::Seven), serialport::DataBits::Seven);
    }

    #[test]
    fn missing_device_fails_to_open() {
        let config = PortConfig::new("/dev/serial-send-does-not-exist");
        assert!(SystemPortOpener.open(&config).is_err());
    }
}
