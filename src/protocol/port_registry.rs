// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One shared handle per serial port path.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::PortConfig;
use crate::protocol::{PortHandle, PortOpener};

/// Table of open-able serial ports, keyed by path.
///
/// The registry holds at most one [`PortHandle`] per path so that every
/// entity wired to the same transmitter writes through the same lock. Create
/// one registry per host and pass it to entity constructors.
///
/// Only the first acquisition of a path decides the port settings. Later
/// acquisitions with different settings get the existing handle unchanged
/// and a warning is logged.
///
/// Dropping the registry shuts down every handle, closing the ports.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use serial_send::config::PortConfig;
/// use serial_send::protocol::{MemoryOpener, PortRegistry};
///
/// let registry = PortRegistry::new(MemoryOpener::new());
///
/// let a = registry.acquire(&PortConfig::new("/dev/ttyUSB0"));
/// let b = registry.acquire(&PortConfig::new("/dev/ttyUSB0").with_baud_rate(115_200));
///
/// // Same handle, first-seen settings
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(b.config().baud_rate, 9600);
/// ```
pub struct PortRegistry {
    opener: Arc<dyn PortOpener>,
    handles: Mutex<HashMap<String, Arc<PortHandle>>>,
}

impl PortRegistry {
    /// Creates an empty registry that opens ports with `opener`.
    #[must_use]
    pub fn new(opener: impl PortOpener + 'static) -> Self {
        Self {
            opener: Arc::new(opener),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an empty registry backed by the operating system's serial ports.
    #[cfg(feature = "serial")]
    #[must_use]
    pub fn system() -> Self {
        Self::new(crate::protocol::SystemPortOpener)
    }

    /// Returns the handle for `config.path`, creating it on first use.
    ///
    /// Creating a handle does not open the port; that happens on the first
    /// send.
    pub fn acquire(&self, config: &PortConfig) -> Arc<PortHandle> {
        let mut handles = self.handles.lock();

        if let Some(handle) = handles.get(&config.path) {
            if handle.config().settings_differ(config) {
                tracing::warn!(
                    path = %config.path,
                    existing = ?handle.config(),
                    requested = ?config,
                    "Port already acquired with different settings, keeping the first ones"
                );
            } else {
                tracing::debug!(path = %config.path, "Reusing existing port handle");
            }
            return Arc::clone(handle);
        }

        tracing::debug!(path = %config.path, "Creating port handle");
        let handle = Arc::new(PortHandle::new(config.clone(), Arc::clone(&self.opener)));
        handles.insert(config.path.clone(), Arc::clone(&handle));
        handle
    }

    /// Returns the handle for `path`, if one was acquired.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<PortHandle>> {
        self.handles.lock().get(path).cloned()
    }

    /// Returns the paths of all acquired ports.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.handles.lock().keys().cloned().collect()
    }

    /// Returns the number of acquired ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Returns true if no port has been acquired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Closes every port. Handles still held by entities refuse further sends.
    pub fn shutdown(&self) {
        let handles = self.handles.lock();
        for handle in handles.values() {
            handle.shutdown();
        }
        if !handles.is_empty() {
            tracing::info!(count = handles.len(), "Closed all serial ports");
        }
    }
}

impl Drop for PortRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PortRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortRegistry")
            .field("paths", &self.paths())
            .finish_non_exhaustive()
    }
}
