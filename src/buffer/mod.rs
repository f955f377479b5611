//! Position/limit byte buffers over shared, reference-counted storage.
//!
//! [`Buffer`] is the substrate every other layer reads from and writes into:
//! a mutable byte region addressed by a read `position` and a `limit`, with a
//! zero-copy [`Buffer::split`] that yields two independently owned views over
//! the same backing allocation. Buffers are produced by an [`Allocator`] and
//! handed between pipeline stages; the stage currently holding a buffer owns
//! it and decides when it is disposed.
//!
//! The backing storage is a [`BytesMut`], so a split shares one allocation
//! between both halves and the region is freed exactly once, when the last
//! owner drops. Disposal flags only gate *when* a holder may release its
//! view; they can never cause a double free.

use bytes::BytesMut;
use thiserror::Error;

pub mod composite;

pub use composite::{CompositeBuffer, WireBuffer};

/// Errors raised by buffer reads, writes, and splits.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// A read would cross the buffer's limit.
    #[error("read past limit: need {needed} bytes, {available} available")]
    OutOfData {
        /// Bytes the read required.
        needed: usize,
        /// Bytes remaining before the limit.
        available: usize,
    },

    /// A write would cross the buffer's capacity. Plain buffers never grow;
    /// only composites do, by appending whole children.
    #[error("write past capacity: need {needed} bytes, {available} available")]
    CapacityExceeded {
        /// Bytes the write required.
        needed: usize,
        /// Bytes remaining before capacity.
        available: usize,
    },

    /// A split point fell outside the `[position, limit]` window.
    #[error("split point {at} outside [{position}, {limit}]")]
    SplitOutOfRange {
        /// Requested split offset.
        at: usize,
        /// Current read position.
        position: usize,
        /// Current limit.
        limit: usize,
    },
}

/// Source of [`Buffer`]s. The core never allocates raw memory itself; every
/// buffer comes from an allocator owned by the worker context.
pub trait Allocator {
    /// Allocate a zeroed buffer of exactly `size` bytes, positioned at 0
    /// with `limit == capacity == size`.
    fn allocate(&self, size: usize) -> Buffer;
}

/// Stock allocator backed by the global heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl Allocator for HeapAllocator {
    fn allocate(&self, size: usize) -> Buffer { Buffer::with_capacity(size) }
}

/// A mutable byte container addressed by read position and limit.
///
/// Invariant: `0 <= position <= limit <= capacity`. Reads operate on the
/// `[position, limit)` window; writes advance `position` up to `capacity`.
/// All multi-byte accessors use network (big-endian) byte order.
#[derive(Debug, Default, PartialEq)]
pub struct Buffer {
    storage: BytesMut,
    position: usize,
    limit: usize,
    disposable: bool,
    disposed: bool,
}

impl Buffer {
    /// Create a zeroed buffer of exactly `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: BytesMut::zeroed(capacity),
            position: 0,
            limit: capacity,
            disposable: false,
            disposed: false,
        }
    }

    /// Create a read-ready buffer holding a copy of `bytes`.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            storage: BytesMut::from(bytes),
            position: 0,
            limit: bytes.len(),
            disposable: false,
            disposed: false,
        }
    }

    /// Current read position.
    #[must_use]
    pub const fn position(&self) -> usize { self.position }

    /// Current limit.
    #[must_use]
    pub const fn limit(&self) -> usize { self.limit }

    /// Total capacity of the backing region.
    #[must_use]
    pub fn capacity(&self) -> usize { self.storage.len() }

    /// Bytes remaining in the readable window, `limit - position`.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.limit - self.position }

    /// Whether any readable bytes remain.
    #[must_use]
    pub const fn has_remaining(&self) -> bool { self.position < self.limit }

    /// The readable window `[position, limit)` as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.storage[self.position..self.limit] }

    fn check_read(&self, needed: usize) -> Result<(), BufferError> {
        if self.remaining() < needed {
            return Err(BufferError::OutOfData {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn check_write(&self, needed: usize) -> Result<(), BufferError> {
        let available = self.capacity() - self.position;
        if available < needed {
            return Err(BufferError::CapacityExceeded { needed, available });
        }
        Ok(())
    }

    /// Read one byte, advancing the position.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when the window is empty.
    pub fn get_u8(&mut self) -> Result<u8, BufferError> {
        self.check_read(1)?;
        let value = self.storage[self.position];
        self.position += 1;
        Ok(value)
    }

    /// Read a big-endian `u32`, advancing the position by 4.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when fewer than 4 bytes remain.
    pub fn get_u32(&mut self) -> Result<u32, BufferError> {
        self.check_read(4)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.storage[self.position..self.position + 4]);
        self.position += 4;
        Ok(u32::from_be_bytes(raw))
    }

    /// Copy `dst.len()` bytes out of the window, advancing the position.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when the window is shorter than `dst`.
    pub fn get_slice(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        self.check_read(dst.len())?;
        dst.copy_from_slice(&self.storage[self.position..self.position + dst.len()]);
        self.position += dst.len();
        Ok(())
    }

    /// Advance the read position by `count` without copying.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when fewer than `count` bytes remain.
    pub fn advance(&mut self, count: usize) -> Result<(), BufferError> {
        self.check_read(count)?;
        self.position += count;
        Ok(())
    }

    /// Write one byte at the position, advancing it.
    ///
    /// # Errors
    /// Returns [`BufferError::CapacityExceeded`] when the region is full.
    pub fn put_u8(&mut self, value: u8) -> Result<(), BufferError> {
        self.check_write(1)?;
        self.storage[self.position] = value;
        self.position += 1;
        self.limit = self.limit.max(self.position);
        Ok(())
    }

    /// Write a big-endian `u32` at the position, advancing it by 4.
    ///
    /// # Errors
    /// Returns [`BufferError::CapacityExceeded`] when fewer than 4 bytes of
    /// capacity remain.
    pub fn put_u32(&mut self, value: u32) -> Result<(), BufferError> {
        self.check_write(4)?;
        self.storage[self.position..self.position + 4].copy_from_slice(&value.to_be_bytes());
        self.position += 4;
        self.limit = self.limit.max(self.position);
        Ok(())
    }

    /// Write `src` at the position, advancing it by `src.len()`.
    ///
    /// # Errors
    /// Returns [`BufferError::CapacityExceeded`] when `src` does not fit.
    pub fn put_slice(&mut self, src: &[u8]) -> Result<(), BufferError> {
        self.check_write(src.len())?;
        self.storage[self.position..self.position + src.len()].copy_from_slice(src);
        self.position += src.len();
        self.limit = self.limit.max(self.position);
        Ok(())
    }

    /// Split off `[at, limit)` into a new buffer sharing the same backing
    /// storage; this buffer's limit (and capacity) are truncated to `at`.
    /// No payload bytes are copied.
    ///
    /// The returned buffer starts at position 0 and inherits the disposable
    /// flag. Both halves are independently owned from here on.
    ///
    /// # Errors
    /// Returns [`BufferError::SplitOutOfRange`] unless
    /// `position <= at <= limit`.
    pub fn split(&mut self, at: usize) -> Result<Buffer, BufferError> {
        if at < self.position || at > self.limit {
            return Err(BufferError::SplitOutOfRange {
                at,
                position: self.position,
                limit: self.limit,
            });
        }
        let tail = self.storage.split_off(at);
        let tail_limit = self.limit - at;
        self.limit = at;
        Ok(Buffer {
            storage: tail,
            position: 0,
            limit: tail_limit,
            disposable: self.disposable,
            disposed: false,
        })
    }

    /// Drop the slack tail after a fixed-size write: the written prefix
    /// `[0, position)` becomes the readable window and the position rewinds
    /// to 0. Used after serialising a fixed header, before attaching a
    /// variable payload.
    pub fn trim(&mut self) {
        self.limit = self.position;
        self.position = 0;
        self.storage.truncate(self.limit);
    }

    /// Mark whether the current holder may release this buffer's view.
    pub fn allow_dispose(&mut self, allowed: bool) { self.disposable = allowed; }

    /// Whether disposal is permitted for the current holder.
    #[must_use]
    pub const fn is_disposable(&self) -> bool { self.disposable }

    /// Release this view of the backing storage. Idempotent: a second call
    /// is a no-op, and shared storage is only freed once the last split or
    /// composite reference is gone.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.position = 0;
        self.limit = 0;
        self.storage = BytesMut::new();
    }

    /// Best-effort disposal: releases the view only when this buffer is
    /// marked disposable and not yet disposed. Returns whether the view was
    /// released.
    pub fn try_dispose(&mut self) -> bool {
        if self.disposable && !self.disposed {
            self.dispose();
            return true;
        }
        false
    }

    /// Whether this buffer's view has already been released.
    #[must_use]
    pub const fn is_disposed(&self) -> bool { self.disposed }
}
