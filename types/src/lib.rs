//! Core domain types for connprobe.
//!
//! This crate contains pure configuration and outcome types with no IO, no async,
//! and minimal dependencies. The transport and the driver both build on it.
//!
//! A [`RunConfig`] is constructed exactly once at startup, from a validated
//! [`TargetHost`] plus the optional request path, [`ConnectionVariant`],
//! [`ProtocolVersion`] and inter-request delay. Every validation failure is a
//! [`ConfigError`] raised before any network activity.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod config;
mod outcome;
mod target;

pub use config::{
    ConfigError, ConnectionVariant, DEFAULT_DELAY_SECS, DEFAULT_PATH, ProtocolVersion, RunConfig,
};
pub use outcome::RequestOutcome;
pub use target::{DEFAULT_PORT, TargetHost};
