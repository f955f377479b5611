//! Exemplar pipeline stage decoding and serialising GOAWAY frames.
//!
//! The read path needs the 9-byte frame header to learn the declared
//! payload length, then a whole unit (`header + payload`) before it calls
//! the codec; anything less is a Stop. When the input holds more than one
//! unit it splits at the unit boundary and forwards the remainder for
//! immediate re-processing. The write path serialises a frame, marks the
//! bytes disposable downstream, and returns the frame to the pool.

use log::warn;
use tracing::trace;

use super::{Filter, FilterContext, ReadOutcome, WriteOutcome};
use crate::{
    buffer::Buffer,
    error::WirebufError,
    frame::{
        FRAME_HEADER_SIZE, Frame, FrameError, FrameHeader, GoAwayFrame,
        goaway::{GOAWAY_FIXED_BODY_SIZE, GOAWAY_TYPE},
    },
};

/// Pipeline stage for the session-termination control frame.
#[derive(Debug, Default)]
pub struct GoAwayFilter;

impl GoAwayFilter {
    /// Create the stage.
    #[must_use]
    pub fn new() -> Self { Self }
}

impl Filter for GoAwayFilter {
    type Inbound = GoAwayFrame;
    type Outbound = GoAwayFrame;

    fn handle_read(
        &mut self,
        ctx: &mut FilterContext,
        mut input: Buffer,
    ) -> Result<ReadOutcome<GoAwayFrame>, WirebufError> {
        let Some(header) = FrameHeader::parse(input.as_slice()) else {
            return Ok(ReadOutcome::NeedMoreData(input));
        };

        if header.frame_type != GOAWAY_TYPE {
            warn!(
                "unexpected frame type {:#04x} on GOAWAY stage",
                header.frame_type
            );
            return Err(FrameError::UnexpectedType {
                actual: header.frame_type,
                expected: GOAWAY_TYPE,
            }
            .into());
        }
        if header.length < GOAWAY_FIXED_BODY_SIZE {
            // Connection-fatal: the declared length cannot hold the fixed body.
            warn!(
                "malformed GOAWAY: declared length {} below fixed body size {}",
                header.length, GOAWAY_FIXED_BODY_SIZE
            );
            return Err(FrameError::MalformedLength {
                frame_type: header.frame_type,
                declared: header.length,
                minimum: GOAWAY_FIXED_BODY_SIZE,
            }
            .into());
        }

        let unit_size = FRAME_HEADER_SIZE + header.length;
        if input.remaining() < unit_size {
            trace!(
                "GOAWAY stage awaiting input: have {}, need {}",
                input.remaining(),
                unit_size
            );
            return Ok(ReadOutcome::NeedMoreData(input));
        }

        let remainder = if input.remaining() > unit_size {
            Some(input.split(input.position() + unit_size)?)
        } else {
            None
        };

        input.advance(FRAME_HEADER_SIZE)?;
        let message = GoAwayFrame::from_buffer(header.stream_id, input, ctx.pool_mut())?;

        Ok(ReadOutcome::Produced { message, remainder })
    }

    fn handle_write(
        &mut self,
        ctx: &mut FilterContext,
        mut message: GoAwayFrame,
    ) -> Result<WriteOutcome, WirebufError> {
        let wire = message.encode(ctx.allocator())?;
        // Encoding detached the payload, so the frame resets cleanly.
        ctx.pool_mut().release(message);
        Ok(WriteOutcome::Invoke(wire))
    }
}
