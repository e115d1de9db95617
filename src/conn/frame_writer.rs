use crate::{
    protocol::{self, Action, CalcFailure},
    reporter::CancellationToken,
    ProviderResult,
};
use std::{net::TcpStream, sync::Mutex};

// The write half of the connection.
//
// Every outbound frame goes through here; the mutex linearizes writes from
// the receive thread (Register, Pong), the dispatcher worker (Result,
// Failure) and the user-held reporters (Progress, Failure). Cancellation
// checks happen under the same lock, so no Progress or Result frame can
// slip out after the Failure frame of its request.
#[derive(Debug)]
pub(crate) struct FrameWriter {
    stream: Mutex<TcpStream>,
}

impl FrameWriter {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }

    // For frames that are not tied to a request.
    pub fn write_frame(&self, action: Action, body: &[u8]) -> ProviderResult<()> {
        let mut stream = self.stream.lock()?;
        protocol::write_frame(&mut *stream, action, body)
    }

    // Progress and Result frames of a request; dropped once the request is
    // cancelled. Returns whether the frame was written.
    pub fn write_frame_unless_cancelled(
        &self,
        action: Action,
        body: &[u8],
        token: &CancellationToken,
    ) -> ProviderResult<bool> {
        let mut stream = self.stream.lock()?;
        if token.is_cancelled() {
            return Ok(false);
        }
        protocol::write_frame(&mut *stream, action, body)?;
        Ok(true)
    }

    // The Failure frame of a request: emit, then cancel, atomically with
    // respect to all other writes of the same request. Returns whether the
    // frame was written.
    pub fn write_failure_frame(
        &self,
        failure: &CalcFailure,
        token: &CancellationToken,
    ) -> ProviderResult<bool> {
        let body = failure.to_body()?;
        let mut stream = self.stream.lock()?;
        if token.is_cancelled() {
            return Ok(false);
        }
        protocol::write_frame(&mut *stream, Action::Failure, &body)?;
        token.cancel();
        Ok(true)
    }
}
