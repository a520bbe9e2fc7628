// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off light driven by two fixed commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::LightConfig;
use crate::error::{ConfigError, Error, SendError};
use crate::protocol::{PortHandle, PortRegistry};
use crate::types::CommandPacket;

/// A light switched by writing one packet for on and another for off.
///
/// There is no feedback from the device, so [`is_on`](Self::is_on) reports
/// the last command issued.
///
/// # Examples
///
/// ```
/// use serial_send::entity::SerialLight;
/// use serial_send::protocol::{MemoryOpener, PortRegistry};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> serial_send::Result<()> {
/// let registry = PortRegistry::new(MemoryOpener::new());
/// let light = SerialLight::from_json(&registry, r#"{
///     "name": "Desk Lamp",
///     "serial_port": "/dev/ttyUSB0",
///     "serial_cmd_turn_on": "A0 01 01 A2",
///     "serial_cmd_turn_off": "A0 01 00 A1"
/// }"#)?;
///
/// light.turn_on().await?;
/// assert!(light.is_on());
/// assert_eq!(light.unique_id(), "A00101A2");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SerialLight {
    name: String,
    unique_id: String,
    port: Arc<PortHandle>,
    turn_on: CommandPacket,
    turn_off: CommandPacket,
    is_on: AtomicBool,
}

impl SerialLight {
    /// Creates a light on the registry's handle for `config.port`.
    #[must_use]
    pub fn new(registry: &PortRegistry, config: LightConfig) -> Self {
        let port = registry.acquire(&config.port);
        tracing::debug!(name = %config.name, path = %port.path(), "Created serial light");

        Self {
            unique_id: config.unique_id,
            name: config.name,
            port,
            turn_on: config.turn_on,
            turn_off: config.turn_off,
            is_on: AtomicBool::new(false),
        }
    }

    /// Parses the configuration and creates the light.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid. No port is
    /// acquired in that case.
    pub fn from_json(registry: &PortRegistry, json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(registry, LightConfig::from_json(json)?))
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a stable identifier: the configured turn-on command with
    /// whitespace removed.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the state set by the last command.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on.load(Ordering::Acquire)
    }

    /// Returns false if the last write to this light's port failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.port.is_available()
    }

    /// Sends the turn-on command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] if the write fails. The light is reported as
    /// on regardless, unless no Tokio runtime was running.
    pub async fn turn_on(&self) -> Result<(), Error> {
        self.switch(true).await
    }

    /// Sends the turn-off command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] if the write fails. The light is reported as
    /// off regardless, unless no Tokio runtime was running.
    pub async fn turn_off(&self) -> Result<(), Error> {
        self.switch(false).await
    }

    async fn switch(&self, on: bool) -> Result<(), Error> {
        let packet = if on { &self.turn_on } else { &self.turn_off };
        let result = Arc::clone(&self.port).send_async(packet.clone()).await;
        if !matches!(result, Err(SendError::NoRuntime { .. })) {
            self.is_on.store(on, Ordering::Release);
        }

        if let Err(e) = &result {
            tracing::warn!(name = %self.name, on, error = %e, "Failed to switch light");
        }
        result.map(|_| ()).map_err(Error::Send)
    }
}
