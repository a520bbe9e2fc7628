// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `serial_send` library.
//!
//! Configuration problems surface as [`ConfigError`] while an entity is being
//! built and stop it from being created. Problems talking to the hardware
//! surface as [`SendError`] at command time; they never poison the entity.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The entity or port configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command could not be written to the serial port.
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// The entity rejected the operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors detected while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A command string is not valid hexadecimal.
    #[error("invalid hex command {value:?}: {reason}")]
    InvalidHex {
        /// The offending command string.
        value: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A command string decoded to zero bytes.
    #[error("command must contain at least one byte")]
    EmptyCommand,

    /// A required field is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field holds a value outside its allowed set.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// The configuration key.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The serial backend cannot apply the requested setting.
    #[error("unsupported serial setting: {0}")]
    Unsupported(String),

    /// The configuration document could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while writing a command to a serial port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The port does not exist, could not be opened, or was shut down.
    #[error("serial port {path} unavailable: {reason}")]
    PortUnavailable {
        /// Port path.
        path: String,
        /// Reason reported by the backend.
        reason: String,
    },

    /// The write errored or did not transfer the whole packet.
    #[error("write to serial port {path} failed: {reason}")]
    WriteFailed {
        /// Port path.
        path: String,
        /// Reason reported by the backend.
        reason: String,
    },

    /// The command was issued outside a Tokio runtime. Nothing was written.
    #[error("no Tokio runtime to dispatch commands to serial port {path}")]
    NoRuntime {
        /// Port path.
        path: String,
    },
}

/// Errors related to entity operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The entity was not configured for the requested feature.
    #[error("entity does not support {capability}")]
    UnsupportedCapability {
        /// The feature that is not configured.
        capability: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
