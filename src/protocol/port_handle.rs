// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch over a single serial port.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::config::PortConfig;
use crate::error::SendError;
use crate::protocol::{PortOpener, SerialLink};
use crate::types::CommandPacket;

/// The single dispatcher for one physical serial port.
///
/// Handles are created by [`PortRegistry::acquire`](super::PortRegistry::acquire)
/// and shared between every entity on the same port. The underlying link is
/// opened lazily by the first [`send`](Self::send) and stays open until
/// [`close`](Self::close) or registry shutdown.
///
/// All writes go through one lock that is held for open, write and flush,
/// so packets sent concurrently from several entities never interleave on
/// the wire. Writes are blocking calls bounded by the port timeout; async
/// callers use [`send_async`](Self::send_async), which runs them on Tokio's
/// blocking pool.
pub struct PortHandle {
    config: PortConfig,
    opener: Arc<dyn PortOpener>,
    link: Mutex<Option<Box<dyn SerialLink>>>,
    // Mirrors `link.is_some()` so status reads never wait on a write.
    open: AtomicBool,
    busy: AtomicBool,
    available: AtomicBool,
    shut_down: AtomicBool,
}

impl PortHandle {
    pub(crate) fn new(config: PortConfig, opener: Arc<dyn PortOpener>) -> Self {
        Self {
            config,
            opener,
            link: Mutex::new(None),
            open: AtomicBool::new(false),
            busy: AtomicBool::new(false),
            available: AtomicBool::new(true),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Returns the settings this handle opens the port with.
    #[must_use]
    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Returns the port path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// Returns true if the link is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Writes a packet to the port, opening it first if necessary.
    ///
    /// Returns the number of bytes written. The busy flag is not consulted.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::PortUnavailable`] if the port cannot be opened or
    /// the handle was shut down, and [`SendError::WriteFailed`] if the write
    /// errors or transfers fewer bytes than the packet holds. After a failed
    /// write the link is dropped so the next send reopens it.
    pub fn send(&self, packet: &CommandPacket) -> Result<usize, SendError> {
        let mut link = self.link.lock();
        let result = self.send_locked(&mut link, packet);
        self.open.store(link.is_some(), Ordering::Release);
        self.available.store(result.is_ok(), Ordering::Release);
        result
    }

    /// Writes a packet from async code.
    ///
    /// The blocking write runs on Tokio's blocking pool so runtime workers
    /// are never stalled by a slow port.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::NoRuntime`] without writing if no Tokio runtime
    /// is running on this thread, otherwise the errors of [`send`](Self::send).
    pub async fn send_async(self: Arc<Self>, packet: CommandPacket) -> Result<usize, SendError> {
        let runtime = Handle::try_current().map_err(|_| self.no_runtime())?;
        let path = self.config.path.clone();

        runtime
            .spawn_blocking(move || self.send(&packet))
            .await
            .map_err(|e| SendError::WriteFailed {
                path,
                reason: e.to_string(),
            })?
    }

    fn send_locked(
        &self,
        link: &mut Option<Box<dyn SerialLink>>,
        packet: &CommandPacket,
    ) -> Result<usize, SendError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(self.unavailable("port has been shut down"));
        }

        let mut port = match link.take() {
            Some(port) => port,
            None => self.open_link()?,
        };

        let expected = packet.len();
        let written = port
            .write(packet.as_bytes())
            .and_then(|n| port.flush().map(|()| n))
            .map_err(|e| self.write_failed(&e.to_string()))?;

        if written != expected {
            return Err(self.write_failed(&format!(
                "short write: {written} of {expected} bytes"
            )));
        }

        tracing::debug!(
            path = %self.config.path,
            written,
            bytes = %packet,
            "Wrote command to serial port"
        );

        *link = Some(port);
        Ok(written)
    }

    fn open_link(&self) -> Result<Box<dyn SerialLink>, SendError> {
        tracing::debug!(path = %self.config.path, "Opening serial port");

        let port = self.opener.open(&self.config).map_err(|e| {
            tracing::warn!(path = %self.config.path, error = %e, "Failed to open serial port");
            self.unavailable(&e.to_string())
        })?;

        tracing::info!(
            path = %self.config.path,
            baud_rate = self.config.baud_rate,
            data_bits = %self.config.data_bits,
            parity = %self.config.parity,
            stop_bits = %self.config.stop_bits,
            "Opened serial port"
        );
        Ok(port)
    }

    fn unavailable(&self, reason: &str) -> SendError {
        SendError::PortUnavailable {
            path: self.config.path.clone(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn no_runtime(&self) -> SendError {
        SendError::NoRuntime {
            path: self.config.path.clone(),
        }
    }

    fn write_failed(&self, reason: &str) -> SendError {
        tracing::warn!(path = %self.config.path, reason, "Serial write failed");
        SendError::WriteFailed {
            path: self.config.path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Sets the busy flag.
    ///
    /// The flag is advisory: it records that a timed pulse is in progress and
    /// has no effect on [`send`](Self::send).
    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }

    /// Returns the busy flag.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Returns false if the most recent send failed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Closes the link. The next send reopens it.
    pub fn close(&self) {
        let mut link = self.link.lock();
        self.open.store(false, Ordering::Release);
        if link.take().is_some() {
            tracing::debug!(path = %self.config.path, "Closed serial port");
        }
    }

    /// Closes the link and refuses any further sends.
    pub(crate) fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        self.close();
    }
}

impl std::fmt::Debug for PortHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortHandle")
            .field("config", &self.config)
            .field("busy", &self.is_busy())
            .field("available", &self.is_available())
            .finish_non_exhaustive()
    }
}
