// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `serial_send` - drive serial-port controlled lights and covers.
//!
//! Cheap RF transmitters and relay boards often take fixed byte sequences
//! over a serial line: one packet turns a light on, another turns it off, and
//! blinds move while a "start" packet is active until an "end" packet
//! arrives. This library exposes such devices as entities a home-automation
//! host can drive, with the byte sequences configured as hex strings.
//!
//! # Features
//!
//! - **Shared ports**: one [`PortHandle`] per port path, writes never interleave
//! - **Lights**: on/off commands with optimistic state
//! - **Covers**: timed start/end pulses with cancellable stop
//! - **Validated configuration**: invalid hex is rejected at load time
//!
//! # Quick Start
//!
//! ```no_run
//! use serial_send::entity::{SerialCover, SerialLight};
//! use serial_send::protocol::PortRegistry;
//!
//! #[tokio::main]
//! async fn main() -> serial_send::Result<()> {
//!     let registry = PortRegistry::system();
//!
//!     let light = SerialLight::from_json(&registry, r#"{
//!         "name": "Desk Lamp",
//!         "serial_port": "/dev/ttyUSB0",
//!         "serial_cmd_turn_on": "A0 01 01 A2",
//!         "serial_cmd_turn_off": "A0 01 00 A1"
//!     }"#)?;
//!
//!     let blind = SerialCover::from_json(&registry, r#"{
//!         "name": "Bedroom Blind",
//!         "serial_port": "/dev/ttyUSB0",
//!         "serial_cmd_start_open": "AA01",
//!         "serial_cmd_end_open": "AA00",
//!         "serial_cmd_start_close": "BB01",
//!         "serial_cmd_end_close": "BB00",
//!         "serial_cmd_interval_ms": 800
//!     }"#)?;
//!
//!     light.turn_on().await?;
//!     blind.open_cover().await?;
//!
//!     // Both entities share one handle for /dev/ttyUSB0
//!     assert_eq!(registry.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `serial` (default): [`SystemPortOpener`](protocol::SystemPortOpener) and
//!   [`PortRegistry::system`] backed by the `serialport` crate. Without it,
//!   supply your own [`PortOpener`](protocol::PortOpener).

pub mod actuator;
pub mod config;
pub mod entity;
pub mod error;
pub mod protocol;
pub mod types;

pub use actuator::{ActuatorState, Direction, TimedActuator};
pub use config::{CoverConfig, LightConfig, PortConfig, PulseCommands};
pub use entity::{CoverFeatures, SerialCover, SerialLight};
pub use error::{ConfigError, DeviceError, Error, Result, SendError};
pub use protocol::{PortHandle, PortRegistry};
pub use types::{CommandPacket, DataBits, Parity, StopBits};
