//! Fixed-header binary frame codec.
//!
//! Every frame starts with a 9-byte header: a 24-bit payload length, an
//! 8-bit type, an 8-bit flag set, and a 31-bit stream identifier whose top
//! bit is reserved and masked to zero on both encode and decode. All fields
//! are network (big-endian) byte order. The variable payload follows the
//! header; its layout is frame-type specific.
//!
//! [`GoAwayFrame`](goaway::GoAwayFrame) is the exemplar codec: a fixed
//! 8-byte body plus an optional opaque trailing payload.

use thiserror::Error;

use crate::buffer::{Allocator, Buffer, BufferError, WireBuffer};

pub mod error_code;
pub mod goaway;

pub use error_code::ErrorCode;
pub use goaway::{GoAwayFrame, GoAwayFrameBuilder};

/// On-wire size of the fixed frame header.
pub const FRAME_HEADER_SIZE: usize = 9;

/// Mask clearing the reserved top bit of a stream identifier.
pub const STREAM_ID_MASK: u32 = 0x7fff_ffff;

/// Largest payload length representable in the 24-bit length field.
pub const MAX_PAYLOAD_LEN: usize = 0x00ff_ffff;

/// Errors raised while decoding or encoding frames.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes available than the frame's fixed body requires. The
    /// pipeline stage guarantees this precondition before calling a codec;
    /// the codec does not recover from it.
    #[error("frame body too short: {available} bytes available, need {needed}")]
    TooShort {
        /// Bytes the fixed body requires.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Declared payload length is inconsistent with the frame's fixed body.
    /// Connection-fatal; individual frames are not recovered.
    #[error("malformed frame type {frame_type:#04x}: declared length {declared} below minimum {minimum}")]
    MalformedLength {
        /// Frame type from the header.
        frame_type: u8,
        /// Payload length declared by the header.
        declared: usize,
        /// Minimum length the fixed body requires.
        minimum: usize,
    },

    /// Header names a frame type this stage does not handle.
    #[error("unexpected frame type {actual:#04x}, expected {expected:#04x}")]
    UnexpectedType {
        /// Type found on the wire.
        actual: u8,
        /// Type the stage decodes.
        expected: u8,
    },

    /// Payload too large for the 24-bit length field.
    #[error("payload length {len} exceeds the 24-bit length field")]
    PayloadOverflow {
        /// Computed payload length.
        len: usize,
    },

    /// Buffer-level failure during field access.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
}

/// The fixed 9-byte header preceding every frame payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    /// Payload length in bytes (24-bit on the wire).
    pub length: usize,
    /// Frame type identifier.
    pub frame_type: u8,
    /// Type-specific flag bits.
    pub flags: u8,
    /// Stream identifier, reserved bit already masked off.
    pub stream_id: u32,
}

impl FrameHeader {
    /// Parse a header from the front of `bytes` without consuming anything.
    /// Returns `None` when fewer than [`FRAME_HEADER_SIZE`] bytes are
    /// present, in which case the caller should wait for more input.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return None;
        }
        let length = usize::from(bytes[0]) << 16 | usize::from(bytes[1]) << 8 | usize::from(bytes[2]);
        let frame_type = bytes[3];
        let flags = bytes[4];
        let stream_id =
            u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) & STREAM_ID_MASK;
        Some(Self {
            length,
            frame_type,
            flags,
            stream_id,
        })
    }

    /// Serialise this header at `buffer`'s position, masking the stream
    /// identifier's reserved bit.
    ///
    /// # Errors
    /// Returns [`FrameError::PayloadOverflow`] when the length does not fit
    /// in 24 bits, or a [`BufferError`] when the buffer is too small.
    pub fn write(&self, buffer: &mut Buffer) -> Result<(), FrameError> {
        if self.length > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadOverflow { len: self.length });
        }
        let len = self.length;
        buffer.put_u8((len >> 16) as u8)?;
        buffer.put_u8((len >> 8) as u8)?;
        buffer.put_u8(len as u8)?;
        buffer.put_u8(self.frame_type)?;
        buffer.put_u8(self.flags)?;
        buffer.put_u32(self.stream_id & STREAM_ID_MASK)?;
        Ok(())
    }
}

/// A typed protocol frame that can serialise itself.
pub trait Frame {
    /// Frame type identifier carried in the header.
    fn frame_type(&self) -> u8;

    /// Flag bits carried in the header.
    fn flags(&self) -> u8 { 0 }

    /// Stream identifier carried in the header.
    fn stream_id(&self) -> u32;

    /// Computed payload length: fixed body plus any variable tail.
    fn payload_len(&self) -> usize;

    /// The header this frame serialises under.
    fn header(&self) -> FrameHeader {
        FrameHeader {
            length: self.payload_len(),
            frame_type: self.frame_type(),
            flags: self.flags(),
            stream_id: self.stream_id() & STREAM_ID_MASK,
        }
    }

    /// Serialise this frame into wire bytes. Detaches any held payload
    /// buffer into the result, so the frame can be recycled afterwards.
    ///
    /// # Errors
    /// Returns a [`FrameError`] when a field does not fit its wire encoding.
    fn encode(&mut self, allocator: &dyn Allocator) -> Result<WireBuffer, FrameError>;
}
