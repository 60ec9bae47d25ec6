use core::fmt;

use fieldlink_proto::{DecodeError, Message};

/// A decoded frame together with the link quality sampled at receipt time.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMessage {
    pub message: Message,
    pub rssi: f32,
    pub snr: f32,
}

/// Why a received frame was discarded.
///
/// Checksum failures are kept apart from the rest: they mean the channel
/// corrupted a frame we would otherwise understand, while `Invalid` covers
/// malformed or unsupported frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxError {
    Invalid(DecodeError),
    ChecksumError,
}

impl fmt::Display for RxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(e) => write!(f, "Invalid frame: {}", e),
            Self::ChecksumError => write!(f, "Frame corrupted in transit"),
        }
    }
}

impl std::error::Error for RxError {}

/// Classifies one raw frame. Pure; all business logic happens downstream.
pub fn validate(raw: &[u8], rssi: f32, snr: f32) -> Result<ValidatedMessage, RxError> {
    match Message::decode(raw) {
        Ok(message) => Ok(ValidatedMessage { message, rssi, snr }),
        Err(DecodeError::ChecksumMismatch) => Err(RxError::ChecksumError),
        Err(error) => Err(RxError::Invalid(error)),
    }
}
