//! Higher-level response message bookkeeping layered above the framing core.
//!
//! [`ResponseHead`] carries the metadata of a response in the text protocol
//! running above the binary framing: a status code, a lazily materialised
//! reason phrase, content-length/chunked bookkeeping, and a non-owning
//! back-reference to the request that triggered it. It contributes no new
//! machinery beyond field bookkeeping, consuming the pool and buffer
//! primitives, but it is the interface the framing layer hands decoded
//! messages to.

use std::sync::{Arc, Weak};

use bytes::Bytes;

use crate::pool::Pooled;

/// A numeric status code with a canonical default reason phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    /// 200 OK.
    pub const OK: Status = Status(200);

    /// Wrap a raw status code.
    #[must_use]
    pub const fn new(code: u16) -> Self { Self(code) }

    /// The numeric code.
    #[must_use]
    pub const fn code(self) -> u16 { self.0 }

    /// The canonical reason phrase for this code; empty for codes without a
    /// registered phrase.
    #[must_use]
    pub const fn default_reason_phrase(self) -> &'static [u8] {
        match self.0 {
            100 => b"Continue",
            101 => b"Switching Protocols",
            200 => b"OK",
            201 => b"Created",
            202 => b"Accepted",
            204 => b"No Content",
            206 => b"Partial Content",
            301 => b"Moved Permanently",
            302 => b"Found",
            304 => b"Not Modified",
            400 => b"Bad Request",
            401 => b"Unauthorized",
            403 => b"Forbidden",
            404 => b"Not Found",
            405 => b"Method Not Allowed",
            408 => b"Request Timeout",
            411 => b"Length Required",
            413 => b"Payload Too Large",
            500 => b"Internal Server Error",
            501 => b"Not Implemented",
            502 => b"Bad Gateway",
            503 => b"Service Unavailable",
            _ => b"",
        }
    }
}

impl Default for Status {
    fn default() -> Self { Self::OK }
}

/// Minimal request metadata so responses have a concrete back-reference
/// target. The full request object belongs to the protocol layer above.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestHead {
    method: Bytes,
    target: Bytes,
}

impl RequestHead {
    /// Create a request head from method and target bytes.
    #[must_use]
    pub fn new(method: impl Into<Bytes>, target: impl Into<Bytes>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
        }
    }

    /// Request method bytes.
    #[must_use]
    pub fn method(&self) -> &[u8] { &self.method }

    /// Request target bytes.
    #[must_use]
    pub fn target(&self) -> &[u8] { &self.target }
}

/// Response metadata: status, lazy reason phrase, body-length bookkeeping,
/// and a non-owning link back to the request.
#[derive(Debug)]
pub struct ResponseHead {
    status: Status,
    reason_phrase: Option<Bytes>,
    allow_custom_reason_phrase: bool,
    content_length: i64,
    chunked: bool,
    request: Weak<RequestHead>,
}

impl Default for ResponseHead {
    fn default() -> Self {
        Self {
            status: Status::OK,
            reason_phrase: None,
            allow_custom_reason_phrase: true,
            content_length: -1,
            chunked: false,
            request: Weak::new(),
        }
    }
}

impl ResponseHead {
    /// Create a response head with defaults (200, unknown length).
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> Status { self.status }

    /// Set the response status code.
    pub fn set_status(&mut self, code: u16) { self.status = Status::new(code); }

    /// The reason phrase to serialise: the custom phrase when one is set and
    /// custom phrases are allowed, else the status-derived default.
    #[must_use]
    pub fn reason_phrase(&self) -> &[u8] {
        if self.allow_custom_reason_phrase
            && let Some(custom) = &self.reason_phrase
        {
            return custom;
        }
        self.status.default_reason_phrase()
    }

    /// Set a custom reason phrase; it only takes effect while custom
    /// phrases are allowed.
    pub fn set_reason_phrase(&mut self, phrase: impl Into<Bytes>) {
        self.reason_phrase = Some(phrase.into());
    }

    /// Toggle whether a custom reason phrase may override the default.
    pub fn set_allow_custom_reason_phrase(&mut self, allowed: bool) {
        self.allow_custom_reason_phrase = allowed;
    }

    /// Declared body length; negative means unknown.
    #[must_use]
    pub const fn content_length(&self) -> i64 { self.content_length }

    /// Set the body length. A negative (unknown) length implicitly switches
    /// the response to chunked transfer and clears the stored length.
    pub fn set_content_length(&mut self, length: i64) {
        if length < 0 {
            self.content_length = -1;
            self.chunked = true;
        } else {
            self.content_length = length;
            self.chunked = false;
        }
    }

    /// Whether the body uses chunked transfer.
    #[must_use]
    pub const fn is_chunked(&self) -> bool { self.chunked }

    /// Link this response to the request that triggered it. The link is
    /// non-owning: the response never keeps the request alive.
    pub fn set_request(&mut self, request: &Arc<RequestHead>) {
        self.request = Arc::downgrade(request);
    }

    /// The triggering request, if it is still alive.
    #[must_use]
    pub fn request(&self) -> Option<Arc<RequestHead>> { self.request.upgrade() }
}

impl Pooled for ResponseHead {
    fn reset(&mut self) {
        self.status = Status::OK;
        self.reason_phrase = None;
        self.allow_custom_reason_phrase = true;
        self.content_length = -1;
        self.chunked = false;
        self.request = Weak::new();
    }

    fn is_reset(&self) -> bool {
        self.status == Status::OK
            && self.reason_phrase.is_none()
            && self.allow_custom_reason_phrase
            && self.content_length == -1
            && !self.chunked
            && self.request.upgrade().is_none()
    }
}
