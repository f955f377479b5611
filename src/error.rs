//! Canonical error and result types for the crate.
//!
//! Two conditions are deliberately *not* errors anywhere in this crate:
//! "insufficient data" is the [`ReadOutcome::NeedMoreData`] control signal,
//! and an unregistered wire error code is the [`ErrorCode::Unknown`]
//! sentinel. Everything else propagates synchronously through
//! [`WirebufError`]; the pipeline stage's caller decides what is
//! connection-fatal.
//!
//! [`ReadOutcome::NeedMoreData`]: crate::pipeline::ReadOutcome::NeedMoreData
//! [`ErrorCode::Unknown`]: crate::frame::ErrorCode::Unknown

use thiserror::Error;

use crate::{buffer::BufferError, frame::FrameError};

/// Top-level error surface exposed by `wirebuf`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WirebufError {
    /// Buffer-level failure: read past limit, write past capacity, or an
    /// out-of-range split.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// Frame-level failure: malformed or truncated frame fields.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Canonical result alias used by `wirebuf` public APIs.
pub type Result<T> = std::result::Result<T, WirebufError>;
