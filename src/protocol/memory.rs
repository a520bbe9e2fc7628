// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory serial port for tests and dry runs.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::PortConfig;
use crate::protocol::{PortOpener, SerialLink};

#[derive(Debug, Default)]
struct MemoryState {
    opened: Vec<String>,
    writes: Vec<Vec<u8>>,
    wire: Vec<u8>,
    fail_opens: bool,
    fail_writes: bool,
    short_writes: bool,
    write_delay: Duration,
}

/// A [`PortOpener`] whose ports record everything written to them.
///
/// Clones share the same recording, so a test can keep one clone and hand
/// another to a [`PortRegistry`](super::PortRegistry).
///
/// Each link copies bytes onto [`wire`](Self::wire) one at a time, yielding
/// between bytes, so unsynchronized concurrent writes would show up as
/// interleaved output.
///
/// # Examples
///
/// ```
/// use serial_send::config::PortConfig;
/// use serial_send::protocol::{MemoryOpener, PortRegistry};
///
/// let opener = MemoryOpener::new();
/// let registry = PortRegistry::new(opener.clone());
/// let port = registry.acquire(&PortConfig::new("/dev/null"));
///
/// port.send(&"A1B2".parse().unwrap()).unwrap();
/// assert_eq!(opener.writes(), vec![vec![0xA1, 0xB2]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryOpener {
    /// Creates an opener with an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent opens fail.
    pub fn fail_opens(&self, fail: bool) {
        self.state.lock().fail_opens = fail;
    }

    /// Makes subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Makes subsequent writes transfer one byte less than requested.
    pub fn short_writes(&self, short: bool) {
        self.state.lock().short_writes = short;
    }

    /// Makes every subsequent write block for `delay` before transferring,
    /// like a slow device or a write nearing its timeout.
    pub fn delay_writes(&self, delay: Duration) {
        self.state.lock().write_delay = delay;
    }

    /// Returns the number of open attempts, successful or not.
    #[must_use]
    pub fn open_attempts(&self) -> usize {
        self.state.lock().opened.len()
    }

    /// Returns the paths passed to each open attempt, in order.
    #[must_use]
    pub fn opened_paths(&self) -> Vec<String> {
        self.state.lock().opened.clone()
    }

    /// Returns each successful write call's payload, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    /// Returns every byte written, in wire order.
    #[must_use]
    pub fn wire(&self) -> Vec<u8> {
        self.state.lock().wire.clone()
    }

    /// Forgets recorded opens and writes.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.opened.clear();
        state.writes.clear();
        state.wire.clear();
    }
}

impl PortOpener for MemoryOpener {
    fn open(&self, config: &PortConfig) -> io::Result<Box<dyn SerialLink>> {
        let mut state = self.state.lock();
        state.opened.push(config.path.clone());
        if state.fail_opens {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such device: {}", config.path),
            ));
        }
        Ok(Box::new(MemoryLink {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryLink {
    state: Arc<Mutex<MemoryState>>,
}

impl SerialLink for MemoryLink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let (fail, short, delay) = {
            let state = self.state.lock();
            (state.fail_writes, state.short_writes, state.write_delay)
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if fail {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device disconnected"));
        }

        let count = if short {
            bytes.len().saturating_sub(1)
        } else {
            bytes.len()
        };
        for byte in &bytes[..count] {
            self.state.lock().wire.push(*byte);
            std::thread::yield_now();
        }
        self.state.lock().writes.push(bytes[..count].to_vec());
        Ok(count)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
