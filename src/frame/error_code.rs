//! Protocol error codes carried by control frames.
//!
//! The set of registered codes is closed, but unknown wire values must still
//! round-trip: a forward-compatible peer may send codes this build does not
//! know, and the rest of the frame must stay parseable. [`ErrorCode::from_wire`]
//! therefore never fails: unregistered values map to [`ErrorCode::Unknown`],
//! which preserves the exact 32-bit value for re-encoding.

use std::fmt;

/// A 32-bit protocol error code with a symbolic name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Graceful shutdown, no error condition.
    #[default]
    NoError,
    /// Peer violated the protocol.
    ProtocolError,
    /// Unexpected internal failure.
    InternalError,
    /// Flow-control limits were violated.
    FlowControlError,
    /// Settings acknowledgement timed out.
    SettingsTimeout,
    /// Frame received on a closed stream.
    StreamClosed,
    /// Frame size was invalid.
    FrameSizeError,
    /// Stream refused before processing.
    RefusedStream,
    /// Stream cancelled by the sender.
    Cancel,
    /// Header compression state broke down.
    CompressionError,
    /// Tunnelled connection failed.
    ConnectError,
    /// Peer is generating excessive load.
    EnhanceYourCalm,
    /// Transport security properties were inadequate.
    InadequateSecurity,
    /// Peer requires a different protocol version.
    Http11Required,
    /// Unregistered wire value, preserved verbatim for round-tripping.
    Unknown(u32),
}

impl ErrorCode {
    /// Resolve a wire value to its symbolic code. Unregistered values map to
    /// [`ErrorCode::Unknown`] rather than failing.
    #[must_use]
    pub const fn from_wire(value: u32) -> Self {
        match value {
            0x0 => Self::NoError,
            0x1 => Self::ProtocolError,
            0x2 => Self::InternalError,
            0x3 => Self::FlowControlError,
            0x4 => Self::SettingsTimeout,
            0x5 => Self::StreamClosed,
            0x6 => Self::FrameSizeError,
            0x7 => Self::RefusedStream,
            0x8 => Self::Cancel,
            0x9 => Self::CompressionError,
            0xa => Self::ConnectError,
            0xb => Self::EnhanceYourCalm,
            0xc => Self::InadequateSecurity,
            0xd => Self::Http11Required,
            other => Self::Unknown(other),
        }
    }

    /// The 32-bit value this code serialises as.
    #[must_use]
    pub const fn to_wire(self) -> u32 {
        match self {
            Self::NoError => 0x0,
            Self::ProtocolError => 0x1,
            Self::InternalError => 0x2,
            Self::FlowControlError => 0x3,
            Self::SettingsTimeout => 0x4,
            Self::StreamClosed => 0x5,
            Self::FrameSizeError => 0x6,
            Self::RefusedStream => 0x7,
            Self::Cancel => 0x8,
            Self::CompressionError => 0x9,
            Self::ConnectError => 0xa,
            Self::EnhanceYourCalm => 0xb,
            Self::InadequateSecurity => 0xc,
            Self::Http11Required => 0xd,
            Self::Unknown(value) => value,
        }
    }

    /// Whether this code is the unregistered-value sentinel.
    #[must_use]
    pub const fn is_unknown(self) -> bool { matches!(self, Self::Unknown(_)) }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => f.write_str("NO_ERROR"),
            Self::ProtocolError => f.write_str("PROTOCOL_ERROR"),
            Self::InternalError => f.write_str("INTERNAL_ERROR"),
            Self::FlowControlError => f.write_str("FLOW_CONTROL_ERROR"),
            Self::SettingsTimeout => f.write_str("SETTINGS_TIMEOUT"),
            Self::StreamClosed => f.write_str("STREAM_CLOSED"),
            Self::FrameSizeError => f.write_str("FRAME_SIZE_ERROR"),
            Self::RefusedStream => f.write_str("REFUSED_STREAM"),
            Self::Cancel => f.write_str("CANCEL"),
            Self::CompressionError => f.write_str("COMPRESSION_ERROR"),
            Self::ConnectError => f.write_str("CONNECT_ERROR"),
            Self::EnhanceYourCalm => f.write_str("ENHANCE_YOUR_CALM"),
            Self::InadequateSecurity => f.write_str("INADEQUATE_SECURITY"),
            Self::Http11Required => f.write_str("HTTP_1_1_REQUIRED"),
            Self::Unknown(value) => write!(f, "UNKNOWN({value:#010x})"),
        }
    }
}
