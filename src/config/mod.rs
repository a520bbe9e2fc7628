// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration for ports and entities.
//!
//! Configuration comes in two layers. The `*Schema` types deserialize the
//! keys found in a host configuration document (`serial_port`, `baudrate`,
//! `serial_cmd_turn_on`, ...). Converting a schema into a `*Config` checks
//! every value and decodes the hex commands, so a config that exists is one
//! that can be used.
//!
//! # Examples
//!
//! ```
//! use serial_send::config::{CoverConfig, LightConfig};
//!
//! let light = LightConfig::from_json(r#"{
//!     "serial_port": "/dev/ttyUSB0",
//!     "serial_cmd_turn_on": "A00101A2",
//!     "serial_cmd_turn_off": "A00100A1"
//! }"#)?;
//! assert_eq!(light.turn_on.len(), 4);
//!
//! // Invalid hex is rejected before anything touches the port
//! let bad = CoverConfig::from_json(r#"{
//!     "serial_port": "/dev/ttyUSB0",
//!     "serial_cmd_start_open": "XYZ",
//!     "serial_cmd_end_open": "AA"
//! }"#);
//! assert!(bad.is_err());
//! # Ok::<(), serial_send::error::ConfigError>(())
//! ```

mod entity_config;
mod port_config;

pub use entity_config::{
    CoverConfig, CoverSchema, DEFAULT_INTERVAL, DEFAULT_NAME, LightConfig, LightSchema,
    PulseCommands,
};
pub use port_config::{DEFAULT_BAUD_RATE, PortConfig, SerialSchema};
