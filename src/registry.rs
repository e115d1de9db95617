//! The static name-to-computation mapping of a provider.
//!
//! The application populates a [`CalcRegistry`] at startup; after
//! [`Provider::start`](crate::Provider::start) it is only read. Dispatch by
//! name stays, but arity, parameter types and the capability slots are
//! explicit and checked at registration time instead of being discovered
//! by reflection.

use crate::{
    protocol::CalcFailure, reporter::CallContext, CalcValue, ProviderError, ProviderResult,
    TypeDesc,
};
use debug_ignore::DebugIgnore;
use std::collections::HashMap;

/// The boxed form of a registered computation.
///
/// It receives the decoded argument vector (one [`CalcValue`] per declared
/// parameter, in order) and the capability handles, and produces the return
/// value or a failure to report.
pub type Invoker =
    Box<dyn Fn(Vec<CalcValue>, &CallContext) -> Result<CalcValue, CalcFailure> + Send + Sync>;

/// Which reporter handles a computation accepts, in declared order.
///
/// This replaces the trailing-callback-parameter detection of older
/// providers; the declared value parameters of a calculation never include
/// the reporters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capabilities {
    /// No reporters.
    None,
    /// A progress reporter only.
    Progress,
    /// A failure reporter only.
    Failure,
    /// Both reporters, progress declared first.
    ProgressFailure,
    /// Both reporters, failure declared first.
    FailureProgress,
}

impl Capabilities {
    pub(crate) fn wants_progress(self) -> bool {
        matches!(
            self,
            Self::Progress | Self::ProgressFailure | Self::FailureProgress
        )
    }

    pub(crate) fn wants_failure(self) -> bool {
        matches!(
            self,
            Self::Failure | Self::ProgressFailure | Self::FailureProgress
        )
    }
}

/// Everything the dispatcher needs to run one registered calculation.
#[derive(Debug)]
pub(crate) struct CallDescriptor {
    pub params: Vec<TypeDesc>,
    pub returns: TypeDesc,
    pub capabilities: Capabilities,
    pub invoker: DebugIgnore<Invoker>,
}

/// The registry of all calculations a provider offers.
#[derive(Debug, Default)]
pub struct CalcRegistry {
    calls: HashMap<String, CallDescriptor>,
}

impl CalcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a calculation under a unique name.
    ///
    /// `params` describes the value parameters in call order, `returns` the
    /// result type, `capabilities` which reporter handles the computation
    /// accepts. Registering a name twice is an error.
    pub fn register<F>(
        &mut self,
        name: &str,
        params: Vec<TypeDesc>,
        returns: TypeDesc,
        capabilities: Capabilities,
        invoker: F,
    ) -> ProviderResult<()>
    where
        F: Fn(Vec<CalcValue>, &CallContext) -> Result<CalcValue, CalcFailure>
            + Send
            + Sync
            + 'static,
    {
        if name.len() > 255 {
            return Err(ProviderError::UsageDetailed(format!(
                "calculation name \"{name}\" exceeds 255 bytes"
            )));
        }
        if self.calls.contains_key(name) {
            return Err(ProviderError::UsageDetailed(format!(
                "calculation \"{name}\" is already registered"
            )));
        }
        self.calls.insert(
            name.to_string(),
            CallDescriptor {
                params,
                returns,
                capabilities,
                invoker: DebugIgnore(Box::new(invoker)),
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    // Resolves a function request to its descriptor; the error cases travel
    // to the supervisor as Failure frames.
    pub(crate) fn lookup(&self, name: &str, argc: usize) -> Result<&CallDescriptor, CalcFailure> {
        let descriptor = self.calls.get(name).ok_or_else(|| {
            CalcFailure::new(
                "NotFound",
                format!("no calculation named \"{name}\" is registered"),
            )
        })?;
        if descriptor.params.len() != argc {
            return Err(CalcFailure::new(
                "ArityMismatch",
                format!(
                    "calculation \"{name}\" takes {} arguments, request carries {argc}",
                    descriptor.params.len()
                ),
            ));
        }
        Ok(descriptor)
    }
}
