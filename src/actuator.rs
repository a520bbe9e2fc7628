// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Momentary pulses for motorized covers.
//!
//! RF transmitters used for blinds keep emitting while "active": a start
//! packet begins the movement and an end packet stops it. [`TimedActuator`]
//! sends the start packet, waits a fixed interval on a background task, then
//! sends the end packet unless the pulse was stopped or replaced first.
//!
//! ```text
//!            start(Open)             interval elapsed / stop()
//!   Idle ─────────────────▶ Opening ───────────────────────────▶ Idle
//!   Idle ─────────────────▶ Closing ───────────────────────────▶ Idle
//!            start(Close)
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::AbortHandle;

use crate::error::SendError;
use crate::protocol::PortHandle;
use crate::types::CommandPacket;

/// Movement state of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActuatorState {
    /// No pulse in progress.
    #[default]
    Idle,
    /// An opening pulse is in progress.
    Opening,
    /// A closing pulse is in progress.
    Closing,
}

impl ActuatorState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Closing => "closing",
        }
    }

    /// Returns true while a pulse is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Open the cover.
    Open,
    /// Close the cover.
    Close,
}

impl From<Direction> for ActuatorState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Open => Self::Opening,
            Direction::Close => Self::Closing,
        }
    }
}

struct Pulse {
    state: ActuatorState,
    // Bumped by every start; a continuation only acts on its own pulse.
    generation: u64,
    end: Option<CommandPacket>,
    timer: Option<AbortHandle>,
}

struct Shared {
    // Held by start, stop and the continuation across their port writes so
    // packets reach the port in command order. State reads never take it.
    commands: AsyncMutex<()>,
    pulse: Mutex<Pulse>,
    state_tx: watch::Sender<ActuatorState>,
}

impl Shared {
    fn set_state(&self, pulse: &mut Pulse, state: ActuatorState) {
        pulse.state = state;
        self.state_tx.send_replace(state);
    }
}

/// Drives start/end pulses on a shared port.
///
/// Port writes run on Tokio's blocking pool, so a slow port never stalls the
/// runtime or the state getters.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use serial_send::actuator::{ActuatorState, Direction, TimedActuator};
/// use serial_send::config::PortConfig;
/// use serial_send::protocol::PortRegistry;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = PortRegistry::system();
/// let actuator = TimedActuator::new(registry.acquire(&PortConfig::new("/dev/ttyUSB0")));
///
/// actuator.start(
///     Direction::Open,
///     &"AA01".parse()?,
///     &"AA00".parse()?,
///     Duration::from_millis(500),
/// ).await?;
/// assert_eq!(actuator.state(), ActuatorState::Opening);
///
/// // Changed our mind: send the end packet now, the timer is cancelled
/// actuator.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct TimedActuator {
    port: Arc<PortHandle>,
    shared: Arc<Shared>,
}

impl TimedActuator {
    /// Creates an idle actuator writing to `port`.
    #[must_use]
    pub fn new(port: Arc<PortHandle>) -> Self {
        let (state_tx, _) = watch::channel(ActuatorState::Idle);
        Self {
            port,
            shared: Arc::new(Shared {
                commands: AsyncMutex::new(()),
                pulse: Mutex::new(Pulse {
                    state: ActuatorState::Idle,
                    generation: 0,
                    end: None,
                    timer: None,
                }),
                state_tx,
            }),
        }
    }

    /// Returns the port this actuator writes to.
    #[must_use]
    pub fn port(&self) -> &Arc<PortHandle> {
        &self.port
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ActuatorState {
        self.shared.pulse.lock().state
    }

    /// Returns a receiver notified on every state transition, including the
    /// one made by the background task when a pulse completes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ActuatorState> {
        self.shared.state_tx.subscribe()
    }

    /// Starts a pulse: sends `start` now and `end` after `interval`.
    ///
    /// A pulse already in progress is replaced; its end packet is not sent.
    /// The end packet is sent from a Tokio task scheduled before `start` is
    /// written, so it still goes out if this future is dropped mid-write.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NoRuntime`] with nothing changed if no Tokio
    /// runtime is running. Otherwise returns the [`SendError`] from writing
    /// `start`; the state still moves to opening/closing and the end packet
    /// is still scheduled, so the cover cannot get stuck waiting on a write
    /// that failed.
    pub async fn start(
        &self,
        direction: Direction,
        start: &CommandPacket,
        end: &CommandPacket,
        interval: Duration,
    ) -> Result<(), SendError> {
        let runtime = Handle::try_current().map_err(|_| self.port.no_runtime())?;
        let _commands = self.shared.commands.lock().await;

        let state = ActuatorState::from(direction);
        {
            let mut pulse = self.shared.pulse.lock();
            if let Some(timer) = pulse.timer.take() {
                timer.abort();
            }
            pulse.generation = pulse.generation.wrapping_add(1);
            pulse.end = Some(end.clone());
            self.shared.set_state(&mut pulse, state);
            self.port.set_busy(true);

            let task = runtime.spawn(finish_pulse(
                Arc::clone(&self.port),
                Arc::clone(&self.shared),
                pulse.generation,
                interval,
            ));
            pulse.timer = Some(task.abort_handle());
        }

        tracing::debug!(
            path = %self.port.path(),
            %state,
            ?interval,
            "Started pulse"
        );

        Arc::clone(&self.port)
            .send_async(start.clone())
            .await
            .map(|_| ())
    }

    /// Ends the current pulse early by sending its end packet.
    ///
    /// Returns `Ok(false)` without sending anything if no pulse is in
    /// progress.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NoRuntime`] with nothing changed if no Tokio
    /// runtime is running. Otherwise returns the [`SendError`] from writing
    /// the end packet; the actuator is idle afterwards either way.
    pub async fn stop(&self) -> Result<bool, SendError> {
        Handle::try_current().map_err(|_| self.port.no_runtime())?;
        let _commands = self.shared.commands.lock().await;

        let (stopped, end) = {
            let mut pulse = self.shared.pulse.lock();
            if !pulse.state.is_active() {
                return Ok(false);
            }
            if let Some(timer) = pulse.timer.take() {
                timer.abort();
            }
            let stopped = pulse.state;
            self.shared.set_state(&mut pulse, ActuatorState::Idle);
            self.port.set_busy(false);
            (stopped, pulse.end.take())
        };

        tracing::debug!(path = %self.port.path(), %stopped, "Stopped pulse");

        match end {
            Some(end) => Arc::clone(&self.port).send_async(end).await.map(|_| true),
            None => Ok(true),
        }
    }
}

impl Drop for TimedActuator {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.pulse.lock().timer.take() {
            timer.abort();
        }
    }
}

impl fmt::Debug for TimedActuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedActuator")
            .field("port", &self.port.path())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn finish_pulse(
    port: Arc<PortHandle>,
    shared: Arc<Shared>,
    generation: u64,
    interval: Duration,
) {
    tokio::time::sleep(interval).await;
    let _commands = shared.commands.lock().await;

    let finished = {
        let mut pulse = shared.pulse.lock();
        if pulse.generation != generation || !pulse.state.is_active() {
            tracing::trace!(path = %port.path(), "Pulse already finished");
            return;
        }

        pulse.timer = None;
        let finished = pulse.state;
        shared.set_state(&mut pulse, ActuatorState::Idle);
        port.set_busy(false);
        pulse.end.take().map(|end| (finished, end))
    };

    let Some((finished, end)) = finished else {
        return;
    };
    match Arc::clone(&port).send_async(end).await {
        Ok(_) => tracing::debug!(path = %port.path(), %finished, "Finished pulse"),
        Err(e) => tracing::warn!(
            path = %port.path(),
            %finished,
            error = %e,
            "Failed to send end of pulse"
        ),
    }
}
