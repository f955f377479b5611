//! Zero-copy concatenation of buffers with per-child disposal flags.
//!
//! [`CompositeBuffer`] joins a fixed header buffer with a variable payload
//! (or any ordered set of buffers) without copying. Each child carries a
//! flag saying whether disposing the composite also disposes that child, so
//! a caller can attach a payload it merely borrows without handing over
//! disposal responsibility.
//!
//! [`WireBuffer`] is the hand-off type between codec and transport: encoding
//! yields either a single contiguous buffer or a composite, and downstream
//! code treats both uniformly.

use super::{Buffer, BufferError};

#[derive(Debug)]
struct Child {
    buffer: Buffer,
    dispose_on_parent: bool,
}

/// Ordered, zero-copy concatenation of child buffers.
///
/// Logical content is the concatenation of each child's readable window, in
/// order. Reads transparently cross child boundaries. Composites grow by
/// appending whole children; they never reallocate or copy.
#[derive(Debug, Default)]
pub struct CompositeBuffer {
    children: Vec<Child>,
    position: usize,
    disposed: bool,
}

impl CompositeBuffer {
    /// Create an empty composite.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Join two buffers, the composite taking disposal responsibility for
    /// both. This is the codec's header-plus-payload case.
    #[must_use]
    pub fn join(first: Buffer, second: Buffer) -> Self {
        let mut composite = Self::new();
        composite.append(first, true);
        composite.append(second, true);
        composite
    }

    /// Append a child to the logical tail. `dispose_on_parent` controls
    /// whether [`CompositeBuffer::dispose`] also disposes this child.
    pub fn append(&mut self, buffer: Buffer, dispose_on_parent: bool) {
        self.children.push(Child {
            buffer,
            dispose_on_parent,
        });
    }

    /// Number of children currently joined.
    #[must_use]
    pub fn child_count(&self) -> usize { self.children.len() }

    /// Total logical length across all children.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.children.iter().map(|c| c.buffer.remaining()).sum()
    }

    /// Bytes remaining before the logical limit.
    #[must_use]
    pub fn remaining(&self) -> usize { self.limit() - self.position }

    /// Whether any readable bytes remain.
    #[must_use]
    pub fn has_remaining(&self) -> bool { self.remaining() > 0 }

    fn byte_at(&self, logical: usize) -> Option<u8> {
        let mut offset = logical;
        for child in &self.children {
            let window = child.buffer.as_slice();
            if offset < window.len() {
                return Some(window[offset]);
            }
            offset -= window.len();
        }
        None
    }

    /// Read one byte, advancing the logical position; routes across child
    /// boundaries.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when no bytes remain.
    pub fn get_u8(&mut self) -> Result<u8, BufferError> {
        let value = self.byte_at(self.position).ok_or(BufferError::OutOfData {
            needed: 1,
            available: self.remaining(),
        })?;
        self.position += 1;
        Ok(value)
    }

    /// Read a big-endian `u32`, advancing the logical position by 4; the
    /// four bytes may span any number of children.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when fewer than 4 bytes remain.
    pub fn get_u32(&mut self) -> Result<u32, BufferError> {
        if self.remaining() < 4 {
            return Err(BufferError::OutOfData {
                needed: 4,
                available: self.remaining(),
            });
        }
        let mut raw = [0u8; 4];
        self.copy_to_slice(&mut raw)?;
        Ok(u32::from_be_bytes(raw))
    }

    /// Copy `dst.len()` bytes out, advancing the logical position.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when fewer bytes remain than `dst`
    /// holds.
    pub fn copy_to_slice(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        if self.remaining() < dst.len() {
            return Err(BufferError::OutOfData {
                needed: dst.len(),
                available: self.remaining(),
            });
        }
        let mut logical = self.position;
        let mut written = 0;
        for child in &self.children {
            let window = child.buffer.as_slice();
            if logical >= window.len() {
                logical -= window.len();
                continue;
            }
            let take = (window.len() - logical).min(dst.len() - written);
            dst[written..written + take].copy_from_slice(&window[logical..logical + take]);
            written += take;
            logical = 0;
            if written == dst.len() {
                break;
            }
        }
        self.position += dst.len();
        Ok(())
    }

    /// Copy the unread remainder into an owned vector, consuming it.
    #[must_use]
    pub fn copy_to_vec(&mut self) -> Vec<u8> {
        let mut out = vec![0u8; self.remaining()];
        // remaining() sizes the destination, so the copy cannot underrun
        let _ = self.copy_to_slice(&mut out);
        out
    }

    /// Dispose exactly the children flagged `dispose_on_parent`. Idempotent;
    /// children attached without the flag are left untouched for their real
    /// owner to release.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for child in &mut self.children {
            if child.dispose_on_parent {
                child.buffer.dispose();
            }
        }
    }

    /// Whether the composite has been disposed.
    #[must_use]
    pub const fn is_disposed(&self) -> bool { self.disposed }
}

/// A serialised unit on its way to the transport: either one contiguous
/// buffer or a zero-copy composite.
#[derive(Debug)]
pub enum WireBuffer {
    /// A single contiguous buffer.
    Single(Buffer),
    /// A composite joining header and payload without copying.
    Composite(CompositeBuffer),
}

impl WireBuffer {
    /// Bytes remaining to be read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        match self {
            Self::Single(buffer) => buffer.remaining(),
            Self::Composite(composite) => composite.remaining(),
        }
    }

    /// Whether this unit is a composite.
    #[must_use]
    pub const fn is_composite(&self) -> bool { matches!(self, Self::Composite(_)) }

    /// Read one byte, advancing the position.
    ///
    /// # Errors
    /// Returns [`BufferError::OutOfData`] when no bytes remain.
    pub fn get_u8(&mut self) -> Result<u8, BufferError> {
        match self {
            Self::Single(buffer) => buffer.get_u8(),
            Self::Composite(composite) => composite.get_u8(),
        }
    }

    /// Copy the unread remainder into an owned vector, consuming it.
    #[must_use]
    pub fn copy_to_vec(&mut self) -> Vec<u8> {
        match self {
            Self::Single(buffer) => {
                let mut out = vec![0u8; buffer.remaining()];
                let _ = buffer.get_slice(&mut out);
                out
            }
            Self::Composite(composite) => composite.copy_to_vec(),
        }
    }

    /// Dispose the underlying storage per each part's flags.
    pub fn dispose(&mut self) {
        match self {
            Self::Single(buffer) => buffer.dispose(),
            Self::Composite(composite) => composite.dispose(),
        }
    }
}
