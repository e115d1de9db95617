use thiserror::Error;

/// A list specifying categories of fatal runtime errors.
///
/// Failures that are reported *to the supervisor* (unknown calculation name,
/// argument mismatches, errors raised by the user computation) are not
/// `ProviderError`s; they travel as [`CalcFailure`](crate::CalcFailure)
/// frames and leave the connection intact.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProviderError {
    /// A frame carried (or was asked to carry) a protocol version other than 1.
    #[error("Unsupported protocol version {}", _0)]
    UnsupportedVersion(u8),

    /// The action byte of an inbound header is not part of the protocol.
    #[error("Unknown action byte {}", _0)]
    UnknownAction(u8),

    /// The peer closed the connection before the announced frame length was read.
    #[error("Connection closed in the middle of a frame")]
    Truncated,

    /// The supervisor sent a frame that a provider must never receive.
    #[error("Protocol violation: {}", _0)]
    ProtocolViolation(&'static str),

    /// The supervisor sent a frame that a provider must never receive.
    #[error("Protocol violation: {}", _0)]
    ProtocolViolationDetailed(String),

    /// A required environment variable is missing.
    #[error("Required environment variable {} is not set", _0)]
    Environment(&'static str),

    /// A required environment variable has an unusable value.
    #[error("Erroneous environment configuration: {}", _0)]
    EnvironmentDetailed(String),

    /// Error occured in communication with the supervisor.
    #[error(transparent)]
    Io {
        /// The causing Error.
        #[from]
        source: std::io::Error,
    },

    /// Serialization through the serde bridge failed.
    #[error("Error occured in serialization")]
    Serialization {
        /// The causing Error.
        #[from]
        source: rmp_serde::encode::Error,
    },

    /// Deserialization through the serde bridge failed.
    #[error("Error occured in deserialization")]
    Deserialization {
        /// The causing Error.
        #[from]
        source: rmp_serde::decode::Error,
    },

    /// Writing a MessagePack value failed.
    #[error("Error occured in value encoding")]
    ValueEncode {
        /// The causing Error.
        #[from]
        source: rmpv::encode::Error,
    },

    /// Reading a MessagePack value failed.
    #[error("Error occured in value decoding")]
    ValueDecode {
        /// The causing Error.
        #[from]
        source: rmpv::decode::Error,
    },

    /// Error occured in thread synchronization.
    #[error("Error occured in thread synchronization")]
    Poison,

    /// Implementation error.
    #[error("Implementation error: {}", _0)]
    Impl(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    Usage(&'static str),

    /// Error caused by wrong usage.
    #[error("Wrong usage: {}", _0)]
    UsageDetailed(String),
}

/// Abbreviation of `Result<T, ProviderError>`.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl<G> From<std::sync::PoisonError<G>> for ProviderError {
    fn from(_error: std::sync::PoisonError<G>) -> Self {
        Self::Poison
    }
}
