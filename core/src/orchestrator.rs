//! Sequences one probe run: transport, first request, idle gap, second request.

use std::io::Write;
use std::time::{Duration, Instant};

use connprobe_types::{RequestOutcome, RunConfig};

use crate::driver;
use crate::error::ProbeError;

/// Lifecycle of a run. Strictly linear; an error at any point ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    TransportReady,
    FirstRequestDone,
    Sleeping,
    SecondRequestDone,
    Terminal,
}

impl RunState {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            RunState::Init => RunState::TransportReady,
            RunState::TransportReady => RunState::FirstRequestDone,
            RunState::FirstRequestDone => RunState::Sleeping,
            RunState::Sleeping => RunState::SecondRequestDone,
            RunState::SecondRequestDone | RunState::Terminal => RunState::Terminal,
        }
    }
}

/// What a completed run observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub first: RequestOutcome,
    pub second: RequestOutcome,
    /// Time between the first request completing and the second one starting.
    pub idle_gap: Duration,
}

struct Run {
    state: RunState,
}

impl Run {
    fn new() -> Self {
        Self {
            state: RunState::Init,
        }
    }

    fn advance(&mut self) {
        let next = self.state.next();
        tracing::debug!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }
}

/// Execute a probe run described by `config`, writing one byte count per
/// request to `out`.
///
/// The transport is built exactly once and both requests go through the same
/// instance. Nothing is retried.
pub async fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<RunReport, ProbeError> {
    let mut run = Run::new();

    let mut requester = connprobe_transport::build(config).await?;
    tracing::debug!(variant = %requester.variant(), "Transport ready");
    run.advance();

    tracing::info!("Performing first request");
    let first = driver::issue(&mut requester, config, out).await?;
    let first_done = Instant::now();
    run.advance();

    tracing::info!(delay = ?config.delay(), "Now sleeping");
    run.advance();
    tokio::time::sleep(config.delay()).await;

    let idle_gap = first_done.elapsed();
    tracing::info!("Performing second request");
    let second = driver::issue(&mut requester, config, out).await?;
    run.advance();

    run.advance();
    debug_assert_eq!(run.state, RunState::Terminal);

    Ok(RunReport {
        first,
        second,
        idle_gap,
    })
}
