use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame shorter than discriminant + checksum
    TooShort,
    /// Unknown message discriminant
    UnknownType(u8),
    /// Frame length does not match the variant's fixed size
    LengthMismatch { expected: usize, actual: usize },
    /// Trailing checksum byte does not match the frame contents
    ChecksumMismatch,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "Frame too short"),
            Self::UnknownType(t) => write!(f, "Unknown message type: 0x{:02X}", t),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {} bytes, got {}", expected, actual)
            }
            Self::ChecksumMismatch => write!(f, "Checksum mismatch"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Physical transmission failed
    Transmit,
    /// Radio hardware could not be initialized
    Init,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transmit => write!(f, "Radio transmit failed"),
            Self::Init => write!(f, "Radio initialization failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RadioError {}
