//! Our error types for the MPOD modules.

use thiserror::Error;

use crate::{address::InvalidChannel, codec::DecodeError};

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Custom error type for MPOD communications.
#[derive(Error, Debug)]
pub enum Error<E: core::fmt::Debug + core::fmt::Display> {
    #[error("Invalid channel {0}: channels range from 1 to 8")]
    InvalidChannel(i32),
    #[error("Malformed value: {0}")]
    MalformedValue(DecodeError),
    #[error("Transport error: {0}")]
    TransportError(E),
    #[error("Error status {status} at {element}")]
    ProtocolError { status: ErrorStatus, element: String },
}

impl<E: core::fmt::Debug + core::fmt::Display> Error<E> {
    /// Whether this failure is worth another attempt, i.e. no response was received at all.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransportError(_))
    }
}

impl<E: core::fmt::Debug + core::fmt::Display> From<InvalidChannel> for Error<E> {
    fn from(err: InvalidChannel) -> Self {
        Error::InvalidChannel(err.0)
    }
}

impl<E: core::fmt::Debug + core::fmt::Display> From<DecodeError> for Error<E> {
    fn from(err: DecodeError) -> Self {
        Error::MalformedValue(err)
    }
}

/// SNMPv2 error-status code as returned in a response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorStatus(pub u32);

impl ErrorStatus {
    /// The RFC 3416 name for this code, if it is a standard one.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self.0 {
            0 => "noError",
            1 => "tooBig",
            2 => "noSuchName",
            3 => "badValue",
            4 => "readOnly",
            5 => "genErr",
            6 => "noAccess",
            7 => "wrongType",
            8 => "wrongLength",
            9 => "wrongEncoding",
            10 => "wrongValue",
            11 => "noCreation",
            12 => "inconsistentValue",
            13 => "resourceUnavailable",
            14 => "commitFailed",
            15 => "undoFailed",
            16 => "authorizationError",
            17 => "notWritable",
            18 => "inconsistentName",
            _ => return None,
        };
        Some(name)
    }
}

impl core::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
