//! Session-termination control frame.
//!
//! A GOAWAY frame tells the peer to stop opening streams: it carries the
//! last stream identifier the sender processed, a protocol [`ErrorCode`],
//! and an optional opaque debug payload of arbitrary length. The fixed body
//! is 8 bytes (4-byte masked identifier, 4-byte error code); anything beyond
//! that is the debug payload, kept as a truncated view of the inbound buffer
//! rather than copied.

use tracing::trace;

use super::{ErrorCode, FRAME_HEADER_SIZE, Frame, FrameError, STREAM_ID_MASK};
use crate::{
    buffer::{Allocator, Buffer, CompositeBuffer, WireBuffer},
    pool::{ObjectPool, Pooled},
};

/// Frame type identifier for GOAWAY.
pub const GOAWAY_TYPE: u8 = 0x7;

/// Size of the frame's fixed body: masked identifier plus error code.
pub const GOAWAY_FIXED_BODY_SIZE: usize = 8;

/// Session-termination control frame: last processed stream, error code,
/// optional opaque debug payload.
#[derive(Debug, Default)]
pub struct GoAwayFrame {
    stream_id: u32,
    last_stream_id: u32,
    error_code: ErrorCode,
    debug_data: Option<Buffer>,
}

impl GoAwayFrame {
    /// Builder for locally constructed outbound frames.
    #[must_use]
    pub fn builder() -> GoAwayFrameBuilder { GoAwayFrameBuilder::default() }

    /// Pool-aware decode of the frame body.
    ///
    /// `buffer` must start at the fixed body (the pipeline stage has already
    /// consumed the frame header). The first 8 bytes become the masked last
    /// stream identifier and the error code; any remainder is retained as
    /// the debug payload without copying. An exhausted buffer is disposed
    /// best-effort.
    ///
    /// # Errors
    /// Returns [`FrameError::TooShort`] when fewer than 8 bytes are
    /// available. The caller guarantees this precondition; the codec does
    /// not recover.
    pub fn from_buffer(
        stream_id: u32,
        mut buffer: Buffer,
        pool: &mut ObjectPool,
    ) -> Result<Self, FrameError> {
        if buffer.remaining() < GOAWAY_FIXED_BODY_SIZE {
            return Err(FrameError::TooShort {
                needed: GOAWAY_FIXED_BODY_SIZE,
                available: buffer.remaining(),
            });
        }
        let mut frame: Self = pool.acquire();
        frame.stream_id = stream_id & STREAM_ID_MASK;
        frame.last_stream_id = buffer.get_u32()? & STREAM_ID_MASK;
        frame.error_code = ErrorCode::from_wire(buffer.get_u32()?);
        if buffer.has_remaining() {
            frame.debug_data = Some(buffer);
        } else {
            buffer.try_dispose();
        }
        trace!(
            "decoded GOAWAY: last_stream_id={}, error_code={}",
            frame.last_stream_id, frame.error_code
        );
        Ok(frame)
    }

    /// Last stream identifier the sender processed (31-bit).
    #[must_use]
    pub const fn last_stream_id(&self) -> u32 { self.last_stream_id }

    /// Protocol error code carried by the frame.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode { self.error_code }

    /// Opaque debug payload, if any.
    #[must_use]
    pub const fn debug_data(&self) -> Option<&Buffer> { self.debug_data.as_ref() }

    fn debug_data_len(&self) -> usize {
        self.debug_data.as_ref().map_or(0, Buffer::remaining)
    }
}

impl Frame for GoAwayFrame {
    fn frame_type(&self) -> u8 { GOAWAY_TYPE }

    fn stream_id(&self) -> u32 { self.stream_id }

    fn payload_len(&self) -> usize { GOAWAY_FIXED_BODY_SIZE + self.debug_data_len() }

    fn encode(&mut self, allocator: &dyn Allocator) -> Result<WireBuffer, FrameError> {
        let mut buffer = allocator.allocate(FRAME_HEADER_SIZE + GOAWAY_FIXED_BODY_SIZE);

        self.header().write(&mut buffer)?;
        buffer.put_u32(self.last_stream_id & STREAM_ID_MASK)?;
        buffer.put_u32(self.error_code.to_wire())?;
        buffer.trim();
        buffer.allow_dispose(true);

        trace!(
            "encoded GOAWAY: last_stream_id={}, error_code={}, debug_data_len={}",
            self.last_stream_id,
            self.error_code,
            self.debug_data_len()
        );

        match self.debug_data.take().filter(Buffer::has_remaining) {
            None => Ok(WireBuffer::Single(buffer)),
            Some(mut debug_data) => {
                // The composite takes disposal responsibility for both parts.
                debug_data.allow_dispose(true);
                Ok(WireBuffer::Composite(CompositeBuffer::join(buffer, debug_data)))
            }
        }
    }
}

impl Pooled for GoAwayFrame {
    fn reset(&mut self) {
        self.stream_id = 0;
        self.last_stream_id = 0;
        self.error_code = ErrorCode::NoError;
        if let Some(mut buffer) = self.debug_data.take() {
            buffer.try_dispose();
        }
    }

    fn is_reset(&self) -> bool {
        self.stream_id == 0
            && self.last_stream_id == 0
            && self.error_code == ErrorCode::NoError
            && self.debug_data.is_none()
    }
}

/// Accumulates GOAWAY fields and builds the frame through the pool.
#[derive(Debug, Default)]
pub struct GoAwayFrameBuilder {
    stream_id: u32,
    last_stream_id: u32,
    error_code: ErrorCode,
    debug_data: Option<Buffer>,
}

impl GoAwayFrameBuilder {
    /// Stream identifier carried in the frame header.
    #[must_use]
    pub const fn stream_id(mut self, stream_id: u32) -> Self {
        self.stream_id = stream_id;
        self
    }

    /// Last stream identifier the sender processed.
    #[must_use]
    pub const fn last_stream_id(mut self, last_stream_id: u32) -> Self {
        self.last_stream_id = last_stream_id;
        self
    }

    /// Protocol error code to carry.
    #[must_use]
    pub const fn error_code(mut self, error_code: ErrorCode) -> Self {
        self.error_code = error_code;
        self
    }

    /// Opaque debug payload to append after the fixed body.
    #[must_use]
    pub fn debug_data(mut self, debug_data: Buffer) -> Self {
        self.debug_data = Some(debug_data);
        self
    }

    /// Build the frame through `pool`, masking identifier reserved bits.
    #[must_use]
    pub fn build(self, pool: &mut ObjectPool) -> GoAwayFrame {
        let mut frame: GoAwayFrame = pool.acquire();
        frame.stream_id = self.stream_id & STREAM_ID_MASK;
        frame.last_stream_id = self.last_stream_id & STREAM_ID_MASK;
        frame.error_code = self.error_code;
        frame.debug_data = self.debug_data;
        frame
    }
}
