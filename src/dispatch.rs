//! The per-request lifecycle: parse, resolve, decode, invoke, emit.
//!
//! The receive loop claims the request slot and hands the raw Function body
//! to a worker thread, so the socket stays responsive (pings!) while the
//! computation runs.

use crate::{
    codec::msgpack,
    conn::FrameWriter,
    protocol::{parts::FunctionRequest, Action, CalcFailure},
    registry::CalcRegistry,
    reporter::{CallContext, CancellationToken, FailureReporter, ProgressReporter},
    ProviderError, ProviderResult,
};
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

// Tracks the single request that may be in flight.
//
// Idle: no token. Running: token present, not cancelled.
// Cancelling: token present and cancelled, the worker has not finished yet.
#[derive(Debug)]
pub(crate) struct RequestSlot(Mutex<Option<CancellationToken>>);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RequestState {
    Idle,
    Running,
    Cancelling,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self(Mutex::new(None))
    }

    // Allocates the fresh token of a new request; refuses while one is in
    // flight.
    pub fn try_begin(&self) -> ProviderResult<CancellationToken> {
        let mut slot = self.0.lock()?;
        if slot.is_some() {
            return Err(ProviderError::ProtocolViolation(
                "a second function request arrived while one is in flight",
            ));
        }
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        Ok(token)
    }

    pub fn finish(&self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }

    #[allow(dead_code)] // observed by tests
    pub fn state(&self) -> RequestState {
        match self.0.lock() {
            Ok(slot) => match &*slot {
                None => RequestState::Idle,
                Some(token) if token.is_cancelled() => RequestState::Cancelling,
                Some(_) => RequestState::Running,
            },
            Err(_) => RequestState::Idle,
        }
    }
}

pub(crate) struct RequestDispatcher {
    registry: Arc<CalcRegistry>,
    writer: Arc<FrameWriter>,
    slot: Arc<RequestSlot>,
}

impl RequestDispatcher {
    pub fn new(registry: Arc<CalcRegistry>, writer: Arc<FrameWriter>) -> Self {
        Self {
            registry,
            writer,
            slot: Arc::new(RequestSlot::new()),
        }
    }

    // Claims the request slot and starts the worker. An Err here is a
    // protocol violation that the engine treats as fatal.
    pub fn dispatch(&self, body: Vec<u8>) -> ProviderResult<()> {
        let token = self.slot.try_begin()?;
        let registry = Arc::clone(&self.registry);
        let writer = Arc::clone(&self.writer);
        let slot = Arc::clone(&self.slot);
        let _detached = std::thread::Builder::new()
            .name("calculation-worker".to_string())
            .spawn(move || {
                if let Err(e) = run_request(&registry, &writer, &body, &token) {
                    error!("Calculation worker terminated with {e}");
                }
                slot.finish();
            })?;
        Ok(())
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

fn run_request(
    registry: &CalcRegistry,
    writer: &Arc<FrameWriter>,
    body: &[u8],
    token: &CancellationToken,
) -> ProviderResult<()> {
    let request = match FunctionRequest::parse(body) {
        Ok(request) => request,
        Err(failure) => return emit_failure(writer, &failure, token),
    };
    debug!(
        "Received function message for \"{}\" with {} argument(s)",
        request.name,
        request.args.len()
    );

    let descriptor = match registry.lookup(&request.name, request.args.len()) {
        Ok(descriptor) => descriptor,
        Err(failure) => return emit_failure(writer, &failure, token),
    };

    let mut args = Vec::with_capacity(request.args.len());
    for (i, (arg_bytes, param_type)) in request.args.iter().zip(&descriptor.params).enumerate() {
        match msgpack::decode_value(arg_bytes, param_type) {
            Ok(value) => args.push(value),
            Err(e) => {
                let failure =
                    CalcFailure::new(e.kind(), format!("argument {i}: {}", e.message()));
                return emit_failure(writer, &failure, token);
            }
        }
    }

    let context = CallContext::new(
        descriptor
            .capabilities
            .wants_progress()
            .then(|| ProgressReporter::new(Arc::clone(writer), token.clone())),
        descriptor
            .capabilities
            .wants_failure()
            .then(|| FailureReporter::new(Arc::clone(writer), token.clone())),
        token.clone(),
    );

    trace!("Invoking calculation \"{}\"", request.name);
    match catch_unwind(AssertUnwindSafe(|| (descriptor.invoker.0)(args, &context))) {
        Ok(Ok(value)) => match msgpack::encode_value(&value, &descriptor.returns) {
            Ok(result_body) => {
                if writer.write_frame_unless_cancelled(Action::Result, &result_body, token)? {
                    debug!("Completed function \"{}\"", request.name);
                } else {
                    debug!(
                        "Result of \"{}\" dropped, the request is cancelled",
                        request.name
                    );
                }
                Ok(())
            }
            // the computation returned a value that does not match its
            // declared return type
            Err(e) => {
                let failure =
                    CalcFailure::new(e.kind(), format!("result encoding failed: {}", e.message()));
                emit_failure(writer, &failure, token)
            }
        },
        Ok(Err(failure)) => emit_failure(writer, &failure, token),
        Err(panic_payload) => {
            let failure = CalcFailure::new("UserError", panic_message(panic_payload.as_ref()));
            emit_failure(writer, &failure, token)
        }
    }
}

fn emit_failure(
    writer: &FrameWriter,
    failure: &CalcFailure,
    token: &CancellationToken,
) -> ProviderResult<()> {
    if writer.write_failure_frame(failure, token)? {
        debug!("Reported failure {failure}");
    } else {
        trace!("Failure {failure} dropped, the request is already cancelled");
    }
    Ok(())
}

// The invocation machinery wraps user errors in a panic payload; dig out
// the innermost human-readable message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "calculation panicked".to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_request_slot_state_machine() {
        let slot = RequestSlot::new();
        assert_eq!(slot.state(), RequestState::Idle);

        let token = slot.try_begin().unwrap();
        assert_eq!(slot.state(), RequestState::Running);

        // a second request must be refused while one is in flight
        assert!(matches!(
            slot.try_begin(),
            Err(ProviderError::ProtocolViolation(_))
        ));

        token.cancel();
        assert_eq!(slot.state(), RequestState::Cancelling);

        slot.finish();
        assert_eq!(slot.state(), RequestState::Idle);

        // a fresh request gets a fresh, uncancelled token
        let token = slot.try_begin().unwrap();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_panic_message_unwrapping() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&"boom".to_string()), "boom");
        assert_eq!(panic_message(&42_i32), "calculation panicked");
    }
}
