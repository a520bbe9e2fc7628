// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for serial command dispatch.
//!
//! Each type validates its input at construction time, so a configuration
//! that loads successfully never fails later because of a malformed value.
//!
//! # Types
//!
//! - [`CommandPacket`] - Raw bytes decoded from a hex command string
//! - [`DataBits`] - Character size (5-8 bits)
//! - [`Parity`] - Parity mode (N/E/O/M/S)
//! - [`StopBits`] - Stop bits (1, 1.5, 2)

mod packet;
mod serial;

pub use packet::CommandPacket;
pub use serial::{DataBits, Parity, StopBits};
