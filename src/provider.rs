use crate::{conn::ConnectionEngine, registry::CalcRegistry, ConnectParams, ProviderResult};
use std::sync::Arc;

/// The provider runtime.
///
/// Owns the registered calculations and drives the connection to the
/// supervisor. There is no reconnection: one `start` call serves one
/// supervisor connection and returns only when that connection is lost or
/// the protocol is violated.
#[derive(Debug)]
pub struct Provider {
    registry: Arc<CalcRegistry>,
}

impl Provider {
    pub fn new(registry: CalcRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Connects to the supervisor named by the `THINKNODE_*` environment
    /// variables, registers, and services requests until a fatal error
    /// occurs. The embedding application is expected to terminate the
    /// process with a non-zero exit code on return.
    pub fn start(&self) -> ProviderResult<()> {
        let params = ConnectParams::from_env()?;
        self.start_with(params)
    }

    /// Like [`start`](Self::start), with explicitly supplied connection
    /// parameters.
    pub fn start_with(&self, params: ConnectParams) -> ProviderResult<()> {
        info!(
            "Starting calculation provider with {} registered calculation(s)",
            self.registry.len()
        );
        let engine = ConnectionEngine::connect(params, Arc::clone(&self.registry))?;
        engine.register()?;
        engine.run()
    }
}
