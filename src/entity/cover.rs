// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cover (blind, shade) driven by momentary pulses.

use std::time::Duration;

use tokio::sync::watch;

use super::CoverFeatures;
use crate::actuator::{ActuatorState, Direction, TimedActuator};
use crate::config::{CoverConfig, PulseCommands};
use crate::error::{ConfigError, DeviceError, Error, SendError};
use crate::protocol::PortRegistry;

/// A cover moved by sending a start packet and, after a fixed interval, an
/// end packet.
///
/// The cover has no position feedback: [`is_closed`](Self::is_closed) is
/// always `None` and only the opening/closing movement is tracked.
///
/// # Examples
///
/// ```
/// use serial_send::entity::SerialCover;
/// use serial_send::protocol::{MemoryOpener, PortRegistry};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> serial_send::Result<()> {
/// let registry = PortRegistry::new(MemoryOpener::new());
/// let cover = SerialCover::from_json(&registry, r#"{
///     "name": "Bedroom Blind",
///     "serial_port": "/dev/ttyUSB0",
///     "serial_cmd_start_open": "AA01",
///     "serial_cmd_end_open": "AA00",
///     "serial_cmd_interval_ms": 500
/// }"#)?;
///
/// cover.open_cover().await?;
/// assert!(cover.is_opening());
///
/// cover.stop_cover().await?;
/// assert!(!cover.is_opening());
///
/// // No close commands were configured
/// assert!(cover.close_cover().await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SerialCover {
    name: String,
    open: PulseCommands,
    close: Option<PulseCommands>,
    interval: Duration,
    features: CoverFeatures,
    actuator: TimedActuator,
}

impl SerialCover {
    /// Creates a cover on the registry's handle for `config.port`.
    #[must_use]
    pub fn new(registry: &PortRegistry, config: CoverConfig) -> Self {
        let features = CoverFeatures::from_config(&config);
        let port = registry.acquire(&config.port);
        tracing::debug!(
            name = %config.name,
            path = %port.path(),
            features = features.bits(),
            "Created serial cover"
        );

        Self {
            name: config.name,
            open: config.open,
            close: config.close,
            interval: config.interval,
            features,
            actuator: TimedActuator::new(port),
        }
    }

    /// Parses the configuration and creates the cover.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid. No port is
    /// acquired in that case.
    pub fn from_json(registry: &PortRegistry, json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(registry, CoverConfig::from_json(json)?))
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the commands this cover accepts.
    #[must_use]
    pub fn supported_features(&self) -> CoverFeatures {
        self.features
    }

    /// Position is not known.
    #[must_use]
    pub fn is_closed(&self) -> Option<bool> {
        None
    }

    /// Returns true while an opening pulse is in progress.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.actuator.state() == ActuatorState::Opening
    }

    /// Returns true while a closing pulse is in progress.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.actuator.state() == ActuatorState::Closing
    }

    /// Returns the movement state.
    #[must_use]
    pub fn state(&self) -> ActuatorState {
        self.actuator.state()
    }

    /// Returns false if the last write to this cover's port failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.actuator.port().is_available()
    }

    /// Returns a receiver notified on every movement state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ActuatorState> {
        self.actuator.subscribe()
    }

    /// Starts opening; the end packet follows after the configured interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] if the start packet could not be written. The
    /// cover is reported as opening regardless, unless no Tokio runtime was
    /// running, in which case nothing happened.
    pub async fn open_cover(&self) -> Result<(), Error> {
        self.start(Direction::Open, &self.open).await
    }

    /// Starts closing; the end packet follows after the configured interval.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnsupportedCapability`] if no close commands are
    /// configured, or [`Error::Send`] if the start packet could not be written.
    pub async fn close_cover(&self) -> Result<(), Error> {
        let close = self.close.as_ref().ok_or_else(|| {
            Error::Device(DeviceError::UnsupportedCapability {
                capability: "close".to_string(),
            })
        })?;
        self.start(Direction::Close, close).await
    }

    /// Stops the current movement by sending its end packet now.
    ///
    /// Returns `false` if the cover was not moving, in which case nothing is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Send`] if the end packet could not be written. The
    /// cover is idle afterwards regardless.
    pub async fn stop_cover(&self) -> Result<bool, Error> {
        self.actuator.stop().await.map_err(|e| self.report(e))
    }

    async fn start(&self, direction: Direction, commands: &PulseCommands) -> Result<(), Error> {
        self.actuator
            .start(direction, &commands.start, &commands.end, self.interval)
            .await
            .map_err(|e| self.report(e))
    }

    fn report(&self, error: SendError) -> Error {
        tracing::warn!(name = %self.name, error = %error, "Cover command failed");
        Error::Send(error)
    }
}

#[cfg(test)]
mod tests {
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    use super::*;
    use crate::config::PortConfig;
    use crate::protocol::MemoryOpener;

    fn commands(start: &str, end: &str) -> PulseCommands {
        PulseCommands::new(start.parse().unwrap(), end.parse().unwrap())
    }

    fn cover(registry: &PortRegistry, with_close: bool) -> SerialCover {
        let mut config = CoverConfig::new("Blind", PortConfig::new("/dev/ttyS0"), commands("AA", "BB"))
            .with_interval(Duration::from_millis(500));
        if with_close {
            config = config.with_close(commands("CC", "DD"));
        }
        SerialCover::new(registry, config)
    }

    #[tokio::test(start_paused = true)]
    async fn open_runs_full_pulse() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let cover = cover(&registry, true);

        cover.open_cover().await.unwrap();
        assert!(cover.is_opening());
        assert!(!cover.is_closing());
        assert_eq!(cover.is_closed(), None);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!cover.is_opening());
        assert_eq!(opener.writes(), vec![vec![0xAA], vec![0xBB]]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_then_stop() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let cover = cover(&registry, true);

        cover.close_cover().await.unwrap();
        assert!(cover.is_closing());
        assert!(cover.stop_cover().await.unwrap());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(opener.writes(), vec![vec![0xCC], vec![0xDD]]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_unsupported_without_commands() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let cover = cover(&registry, false);

        assert!(!cover.supported_features().supports_close());
        let err = cover.close_cover().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError::UnsupportedCapability { .. })
        ));
        assert!(opener.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_sends_nothing() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let cover = cover(&registry, true);

        assert!(!cover.stop_cover().await.unwrap());
        assert!(opener.writes().is_empty());
    }

    #[test]
    fn open_outside_runtime_sends_nothing() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let cover = cover(&registry, true);

        let mut open = pin!(cover.open_cover());
        let result = open.as_mut().poll(&mut Context::from_waker(Waker::noop()));
        assert!(matches!(
            result,
            Poll::Ready(Err(Error::Send(SendError::NoRuntime { .. })))
        ));
        assert!(!cover.is_opening());
        assert!(!cover.actuator.port().is_busy());
        assert!(opener.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_marks_unavailable() {
        let opener = MemoryOpener::new();
        opener.fail_opens(true);
        let registry = PortRegistry::new(opener);
        let cover = cover(&registry, true);

        assert!(matches!(cover.open_cover().await, Err(Error::Send(_))));
        assert!(cover.is_opening());
        assert!(!cover.is_available());
    }
}
