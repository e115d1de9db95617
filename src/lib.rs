//! A calculation provider runtime.
//!
//! A provider is a worker process that connects to a calculation
//! supervisor over TCP, registers itself as a computation endpoint, and
//! then services function-invocation requests. Applications register their
//! computations in a [`CalcRegistry`] and hand it to a [`Provider`];
//! connecting, framing, serialization, dispatch, progress and failure
//! reporting and liveness are handled here.
//!
//! ```rust,no_run
//! use thinknode_provider::{
//!     CalcFailure, CalcRegistry, CalcValue, Capabilities, Provider, TypeDesc,
//! };
//!
//! fn main() {
//!     let mut registry = CalcRegistry::new();
//!     registry
//!         .register(
//!             "Add",
//!             vec![TypeDesc::Integer, TypeDesc::Integer],
//!             TypeDesc::Integer,
//!             Capabilities::None,
//!             |args, _ctx| match (&args[0], &args[1]) {
//!                 (CalcValue::Integer(a), CalcValue::Integer(b)) => {
//!                     Ok(CalcValue::Integer(a + b))
//!                 }
//!                 _ => Err(CalcFailure::new("BadArgs", "expected two integers")),
//!             },
//!         )
//!         .unwrap();
//!
//!     // returns only on a fatal error
//!     let error = Provider::new(registry).start().unwrap_err();
//!     eprintln!("provider terminated: {error}");
//!     std::process::exit(1);
//! }
//! ```

#![deny(missing_debug_implementations)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate log;

mod codec;
mod conn;
mod dispatch;
mod prov_error;
mod protocol;
mod provider;
mod registry;
mod reporter;

pub use crate::codec::{from_calc_value, to_calc_value, CalcValue, Timestamp, TypeDesc};
pub use crate::conn::ConnectParams;
pub use crate::prov_error::{ProviderError, ProviderResult};
pub use crate::protocol::CalcFailure;
pub use crate::provider::Provider;
pub use crate::registry::{CalcRegistry, Capabilities, Invoker};
pub use crate::reporter::{CallContext, CancellationToken, FailureReporter, ProgressReporter};
