//! Request-scoped handles that a running computation uses to talk back to
//! the supervisor.

use crate::{
    conn::FrameWriter,
    protocol::{parts::Progress, Action, CalcFailure},
    ProviderResult,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// The cancellation flag of one in-flight request.
///
/// It is set when a Failure frame is emitted for the request, either through
/// the [`FailureReporter`] or by an error escaping the computation. Setting
/// it never interrupts the computation; long-running code is expected to
/// poll [`is_cancelled`](Self::is_cancelled) and wind down on its own.
#[derive(Clone, Debug)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Streams progress of the running computation to the supervisor.
///
/// Once the request is cancelled, further reports are silently dropped.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    writer: Arc<FrameWriter>,
    token: CancellationToken,
}

impl ProgressReporter {
    pub(crate) fn new(writer: Arc<FrameWriter>, token: CancellationToken) -> Self {
        Self { writer, token }
    }

    /// Emits a Progress frame with the given fraction (0 to 1, not clamped
    /// here) and message (truncated to 65 535 bytes).
    pub fn report(&self, fraction: f32, message: &str) -> ProviderResult<()> {
        let body = Progress::new(fraction, message).to_body()?;
        debug!("Reporting progress ({fraction})");
        if !self
            .writer
            .write_frame_unless_cancelled(Action::Progress, &body, &self.token)?
        {
            trace!("Progress report dropped, request is cancelled");
        }
        Ok(())
    }
}

/// Reports the running computation as failed.
///
/// Emitting the Failure frame cancels the request: later progress reports
/// and the eventual return value of the computation are discarded.
#[derive(Clone, Debug)]
pub struct FailureReporter {
    writer: Arc<FrameWriter>,
    token: CancellationToken,
}

impl FailureReporter {
    pub(crate) fn new(writer: Arc<FrameWriter>, token: CancellationToken) -> Self {
        Self { writer, token }
    }

    /// Emits a Failure frame with the given code (truncated to 255 bytes)
    /// and message (truncated to 65 535 bytes), then flags the request as
    /// cancelled. A no-op if the request is already cancelled.
    pub fn report(&self, code: &str, message: &str) -> ProviderResult<()> {
        debug!("Reporting failure with code \"{code}\"");
        let failure = CalcFailure::new(code, message);
        if !self.writer.write_failure_frame(&failure, &self.token)? {
            trace!("Failure report dropped, request is already cancelled");
        }
        Ok(())
    }
}

/// The capability handles passed to a registered computation, populated
/// according to its declared [`Capabilities`](crate::Capabilities).
#[derive(Debug)]
pub struct CallContext {
    progress: Option<ProgressReporter>,
    failure: Option<FailureReporter>,
    token: CancellationToken,
}

impl CallContext {
    pub(crate) fn new(
        progress: Option<ProgressReporter>,
        failure: Option<FailureReporter>,
        token: CancellationToken,
    ) -> Self {
        Self {
            progress,
            failure,
            token,
        }
    }

    /// The progress reporter, if the calculation was registered with the
    /// progress capability.
    pub fn progress(&self) -> Option<&ProgressReporter> {
        self.progress.as_ref()
    }

    /// The failure reporter, if the calculation was registered with the
    /// failure capability.
    pub fn failure(&self) -> Option<&FailureReporter> {
        self.failure.as_ref()
    }

    /// The cancellation flag of this request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }
}
