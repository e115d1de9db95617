use crate::{ProviderError, ProviderResult};

// Defines the meaning of a frame.
// Is documented as Action.
// The full byte range 0..=6 is in use; anything else is a protocol error.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Register = 0, // Provider announces itself after connecting
    Function = 1, // Supervisor requests a calculation
    Progress = 2, // Provider reports progress of the running calculation
    Result = 3,   // Provider delivers the calculation result
    Failure = 4,  // Provider reports a failed calculation
    Ping = 5,     // Supervisor probes liveness
    Pong = 6,     // Provider answers a ping
}

impl Action {
    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(val: u8) -> ProviderResult<Self> {
        match val {
            0 => Ok(Self::Register),
            1 => Ok(Self::Function),
            2 => Ok(Self::Progress),
            3 => Ok(Self::Result),
            4 => Ok(Self::Failure),
            5 => Ok(Self::Ping),
            6 => Ok(Self::Pong),
            _ => Err(ProviderError::UnknownAction(val)),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
