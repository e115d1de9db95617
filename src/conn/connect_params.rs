//! Connection parameters
use crate::{protocol::parts::PID_LEN, ProviderError, ProviderResult};

const ENV_HOST: &str = "THINKNODE_HOST";
const ENV_PORT: &str = "THINKNODE_PORT";
const ENV_PID: &str = "THINKNODE_PID";

/// An immutable struct with all information necessary to connect to the
/// calculation supervisor.
///
/// In production the supervisor provides the values through the environment
/// (`THINKNODE_HOST`, `THINKNODE_PORT`, `THINKNODE_PID`); use
/// [`from_env`](Self::from_env). Embedding code and tests can build the
/// parameters directly with [`new`](Self::new).
///
/// The pid is the 32-byte process-correlation identifier that travels in
/// the Register frame; any other length is rejected here so that the
/// registration body is always exactly 34 bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectParams {
    host: String,
    port: u16,
    pid: String,
    addr: String,
}

impl ConnectParams {
    pub fn new<H: Into<String>, P: Into<String>>(
        host: H,
        port: u16,
        pid: P,
    ) -> ProviderResult<Self> {
        let host = host.into();
        let pid = pid.into();
        if pid.len() != PID_LEN {
            return Err(ProviderError::UsageDetailed(format!(
                "pid must be {PID_LEN} bytes, got {} bytes",
                pid.len()
            )));
        }
        Ok(Self {
            addr: format!("{host}:{port}"),
            host,
            port,
            pid,
        })
    }

    /// Reads host, port and pid from the environment.
    pub fn from_env() -> ProviderResult<Self> {
        let host = env_var(ENV_HOST)?;
        let port_value = env_var(ENV_PORT)?;
        let port = port_value.parse::<u16>().map_err(|e| {
            ProviderError::EnvironmentDetailed(format!(
                "{ENV_PORT} must be a decimal TCP port, got \"{port_value}\": {e}"
            ))
        })?;
        let pid = env_var(ENV_PID)?;
        if pid.len() != PID_LEN {
            return Err(ProviderError::EnvironmentDetailed(format!(
                "{ENV_PID} must be {PID_LEN} bytes, got {} bytes",
                pid.len()
            )));
        }
        Self::new(host, port, pid)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    /// The `host:port` form used for connecting.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

fn env_var(name: &'static str) -> ProviderResult<String> {
    std::env::var(name).map_err(|_| ProviderError::Environment(name))
}

#[cfg(test)]
mod test {
    use super::*;

    const PID: &str = "abcdefghijklmnopqrstuvwxyz012345";

    #[test]
    fn test_params() {
        let params = ConnectParams::new("calc.example.com", 9072, PID).unwrap();
        assert_eq!(params.host(), "calc.example.com");
        assert_eq!(params.port(), 9072);
        assert_eq!(params.pid(), PID);
        assert_eq!(params.addr(), "calc.example.com:9072");

        assert!(ConnectParams::new("calc.example.com", 9072, "too-short").is_err());
    }

    // all environment manipulation lives in this one test to keep the
    // process-global state race-free
    #[test]
    fn test_params_from_env() {
        std::env::remove_var(ENV_HOST);
        std::env::remove_var(ENV_PORT);
        std::env::remove_var(ENV_PID);
        assert!(matches!(
            ConnectParams::from_env(),
            Err(ProviderError::Environment(ENV_HOST))
        ));

        std::env::set_var(ENV_HOST, "127.0.0.1");
        std::env::set_var(ENV_PORT, "not-a-port");
        std::env::set_var(ENV_PID, PID);
        assert!(matches!(
            ConnectParams::from_env(),
            Err(ProviderError::EnvironmentDetailed(_))
        ));

        std::env::set_var(ENV_PORT, "9072");
        std::env::set_var(ENV_PID, "short");
        assert!(matches!(
            ConnectParams::from_env(),
            Err(ProviderError::EnvironmentDetailed(_))
        ));

        std::env::set_var(ENV_PID, PID);
        let params = ConnectParams::from_env().unwrap();
        assert_eq!(params.addr(), "127.0.0.1:9072");
        assert_eq!(params.pid(), PID);

        std::env::remove_var(ENV_HOST);
        std::env::remove_var(ENV_PORT);
        std::env::remove_var(ENV_PID);
    }
}
