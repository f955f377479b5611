//! Public API for the `wirebuf` library.
//!
//! This crate is the binary framing and pipelined-processing core of a
//! network protocol stack: position/limit buffers over shared storage with
//! zero-copy split and composite views, a per-worker object pool for
//! frame and message reuse, a fixed-header frame codec with a
//! session-termination exemplar, and a Stop/Invoke filter pipeline that
//! assembles partial reads into whole messages and serialises outbound
//! ones.

pub mod buffer;
pub mod error;
/// Result type alias re-exported for convenience.
pub use error::{Result, WirebufError};
pub mod frame;
pub mod message;
pub mod pipeline;
pub mod pool;

pub use buffer::{Allocator, Buffer, BufferError, CompositeBuffer, HeapAllocator, WireBuffer};
pub use frame::{
    ErrorCode,
    FRAME_HEADER_SIZE,
    Frame,
    FrameError,
    FrameHeader,
    GoAwayFrame,
    GoAwayFrameBuilder,
    STREAM_ID_MASK,
};
pub use message::{RequestHead, ResponseHead, Status};
pub use pipeline::{Filter, FilterContext, GoAwayFilter, PipelineDriver, ReadOutcome, WriteOutcome};
pub use pool::{ObjectPool, Pooled};
