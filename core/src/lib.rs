//! Request driver and run orchestration for connprobe.
//!
//! # Run Lifecycle
//!
//! ```text
//! Init -> TransportReady -> FirstRequestDone -> Sleeping -> SecondRequestDone -> Terminal
//! ```
//!
//! [`run`] builds the transport once, issues the first request, sleeps for
//! the configured delay, then issues the second request through the same
//! [`connprobe_transport::Requester`]. Each request writes its body byte count
//! to the caller's output on its own line.
//!
//! # Error Handling
//!
//! Every operational failure is a [`ProbeError`] returned to the caller, which
//! decides how to terminate. A negotiated protocol that differs from the
//! configured one is not an error value: [`driver::assert_protocol`] panics.

pub mod driver;
mod error;
mod orchestrator;

pub use driver::{PROBE_USER_AGENT, issue};
pub use error::ProbeError;
pub use orchestrator::{RunReport, RunState, run};
