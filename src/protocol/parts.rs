mod failure;
mod function_request;
mod progress;
mod registration;

pub use failure::CalcFailure;

pub(crate) use function_request::FunctionRequest;
pub(crate) use progress::Progress;
pub(crate) use registration::{Registration, PID_LEN};
