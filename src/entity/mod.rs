// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing entities.
//!
//! - [`SerialLight`]: on/off light, one packet per command
//! - [`SerialCover`]: cover driven by timed start/end pulses
//!
//! Entities on the same port path share one
//! [`PortHandle`](crate::protocol::PortHandle) from the
//! [`PortRegistry`](crate::protocol::PortRegistry) they were created with.

mod cover;
mod features;
mod light;

pub use cover::SerialCover;
pub use features::CoverFeatures;
pub use light::SerialLight;
