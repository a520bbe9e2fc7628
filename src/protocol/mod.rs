// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serial port access.
//!
//! # Components
//!
//! - [`PortRegistry`]: one shared [`PortHandle`] per port path
//! - [`PortHandle`]: lazily opened port that serializes command writes
//! - [`SystemPortOpener`]: OS serial ports (feature `serial`, on by default)
//! - [`MemoryOpener`]: in-memory ports that record writes
//!
//! The [`PortOpener`] and [`SerialLink`] traits are the seam between command
//! dispatch and the device, so hosts can plug in other transports.

pub mod memory;
mod port_handle;
mod port_registry;
#[cfg(feature = "serial")]
mod serial;

pub use memory::MemoryOpener;
pub use port_handle::PortHandle;
pub use port_registry::PortRegistry;
#[cfg(feature = "serial")]
pub use serial::{DEFAULT_WRITE_TIMEOUT, SystemPortOpener};

use std::io;

use crate::config::PortConfig;

/// An open, writable serial connection.
pub trait SerialLink: Send {
    /// Writes `bytes` and returns how many were accepted.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by the device.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Blocks until buffered bytes have been handed to the device.
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported by the device.
    fn flush(&mut self) -> io::Result<()>;
}

/// Opens a [`SerialLink`] for a port configuration.
pub trait PortOpener: Send + Sync {
    /// Opens the port at `config.path` with the configured line settings.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the device is missing, busy, or rejects the
    /// settings.
    fn open(&self, config: &PortConfig) -> io::Result<Box<dyn SerialLink>>;
}
