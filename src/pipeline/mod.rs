//! Stop/Invoke filter pipeline for assembling and serialising messages.
//!
//! A [`Filter`] is one unit in an ordered processing chain. On the read path
//! it is handed whatever bytes are currently available and must be
//! resumable: it either reconstructs exactly one logical message (forwarding
//! any leftover bytes) or signals that more input is needed, returning the
//! unconsumed buffer unchanged. On the write path it turns an outbound
//! message into wire bytes; write never retains buffers across invocations.
//!
//! "Need more data" is a control signal, not an error. It is expressed by
//! returning [`ReadOutcome::NeedMoreData`], never by blocking. A single
//! connection's read-path invocations are strictly sequential (as are its
//! write-path invocations), which is what makes the partial-message state
//! held by a filter and its [`PipelineDriver`] safe without locking.

use crate::{
    buffer::{Allocator, Buffer, WireBuffer},
    error::WirebufError,
    pool::ObjectPool,
};

pub mod goaway_filter;

pub use goaway_filter::GoAwayFilter;

/// Result of a read-path invocation.
#[derive(Debug)]
pub enum ReadOutcome<M> {
    /// Stop: not enough bytes to decode one unit. Carries the unconsumed
    /// input unchanged; the upstream accumulator appends newly arrived
    /// bytes and re-invokes.
    NeedMoreData(Buffer),
    /// Invoke: one logical unit was decoded. `remainder` holds any bytes
    /// past the unit boundary for immediate re-processing.
    Produced {
        /// The reconstructed message.
        message: M,
        /// Leftover bytes beyond the decoded unit, if any.
        remainder: Option<Buffer>,
    },
}

/// Result of a write-path invocation: serialised bytes ready for the
/// transport, marked disposable downstream.
#[derive(Debug)]
pub enum WriteOutcome {
    /// Invoke: hand the serialised unit to the next stage.
    Invoke(WireBuffer),
}

/// Per-worker context a filter runs against: the object pool backing frame
/// and message reuse, and the allocator all buffers come from. One context
/// per connection direction; it moves with its worker and is never shared.
pub struct FilterContext {
    pool: ObjectPool,
    allocator: Box<dyn Allocator + Send>,
}

impl std::fmt::Debug for FilterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterContext")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl FilterContext {
    /// Create a context around `allocator` with a fresh pool.
    #[must_use]
    pub fn new(allocator: Box<dyn Allocator + Send>) -> Self {
        Self {
            pool: ObjectPool::new(),
            allocator,
        }
    }

    /// The worker's object pool.
    pub fn pool_mut(&mut self) -> &mut ObjectPool { &mut self.pool }

    /// The worker's allocator.
    #[must_use]
    pub fn allocator(&self) -> &dyn Allocator { self.allocator.as_ref() }
}

/// One unit of read/write processing in an ordered chain.
pub trait Filter {
    /// Message type produced by the read path.
    type Inbound;
    /// Message type consumed by the write path.
    type Outbound;

    /// Process currently available inbound bytes. Must not block; a partial
    /// unit is reported via [`ReadOutcome::NeedMoreData`].
    ///
    /// # Errors
    /// Returns a [`WirebufError`] for malformed input; the caller decides
    /// whether the condition is connection-fatal.
    fn handle_read(
        &mut self,
        ctx: &mut FilterContext,
        input: Buffer,
    ) -> Result<ReadOutcome<Self::Inbound>, WirebufError>;

    /// Serialise one outbound message into wire bytes.
    ///
    /// # Errors
    /// Returns a [`WirebufError`] when the message cannot be serialised.
    fn handle_write(
        &mut self,
        ctx: &mut FilterContext,
        message: Self::Outbound,
    ) -> Result<WriteOutcome, WirebufError>;
}

/// Upstream accumulator driving a filter: retains the partial buffer across
/// Stop signals, merges it with newly arrived bytes, and loops while the
/// filter forwards remainders so back-to-back units in one chunk all
/// surface.
pub struct PipelineDriver<F> {
    filter: F,
    ctx: FilterContext,
    pending: Option<Buffer>,
}

impl<F: std::fmt::Debug> std::fmt::Debug for PipelineDriver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineDriver")
            .field("filter", &self.filter)
            .field("ctx", &self.ctx)
            .field("pending", &self.pending)
            .finish()
    }
}

impl<F: Filter> PipelineDriver<F> {
    /// Create a driver around `filter` and the worker's allocator.
    #[must_use]
    pub fn new(filter: F, allocator: Box<dyn Allocator + Send>) -> Self {
        Self {
            filter,
            ctx: FilterContext::new(allocator),
            pending: None,
        }
    }

    /// The worker context, for pool configuration.
    pub fn context_mut(&mut self) -> &mut FilterContext { &mut self.ctx }

    /// Bytes currently retained while awaiting more input.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, Buffer::remaining)
    }

    /// Feed newly arrived bytes through the read path, returning every
    /// message that became decodable.
    ///
    /// # Errors
    /// Propagates filter errors; the retained partial state is dropped on
    /// error since malformed input is connection-fatal.
    pub fn push(&mut self, input: Buffer) -> Result<Vec<F::Inbound>, WirebufError> {
        let mut current = match self.pending.take() {
            Some(pending) => Self::merge(self.ctx.allocator(), pending, input)?,
            None => input,
        };
        let mut messages = Vec::new();
        loop {
            match self.filter.handle_read(&mut self.ctx, current)? {
                ReadOutcome::NeedMoreData(retained) => {
                    self.pending = Some(retained);
                    break;
                }
                ReadOutcome::Produced { message, remainder } => {
                    messages.push(message);
                    match remainder {
                        Some(rest) => current = rest,
                        None => break,
                    }
                }
            }
        }
        Ok(messages)
    }

    /// Serialise one outbound message, returning the wire bytes.
    ///
    /// # Errors
    /// Propagates filter serialisation errors.
    pub fn write(&mut self, message: F::Outbound) -> Result<WireBuffer, WirebufError> {
        let WriteOutcome::Invoke(wire) = self.filter.handle_write(&mut self.ctx, message)?;
        Ok(wire)
    }

    /// Merge retained and newly arrived bytes into one fresh buffer. The
    /// copy only happens on the cold partial path; whole-unit arrivals
    /// bypass it entirely.
    fn merge(
        allocator: &dyn Allocator,
        mut pending: Buffer,
        mut fresh: Buffer,
    ) -> Result<Buffer, WirebufError> {
        let mut merged = allocator.allocate(pending.remaining() + fresh.remaining());
        merged.put_slice(pending.as_slice())?;
        merged.put_slice(fresh.as_slice())?;
        merged.trim();
        merged.allow_dispose(true);
        pending.try_dispose();
        fresh.try_dispose();
        Ok(merged)
    }
}

#[cfg(test)]
mod tests;
