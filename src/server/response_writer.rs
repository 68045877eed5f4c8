use crate::base_serializer::{HeaderError, MessageState};
use crate::buffer::IoBuf;
use crate::enums::StatusCode;

#[cfg(feature = "date_header")]
use std::time::SystemTime;


/// Interface for writing a response into the connection's send buffer
///
/// A handler receives this in `respond` and, for multi-fragment
/// responses, again in `send_more`. The full header section must be
/// written from `respond`: once the first fragment has been submitted the
/// underlying message state only accepts body bytes.
///
/// Calling [`finish`](#method.finish) marks the current fragment as the
/// last one; leaving it out tells the connection to come back for more
/// via `send_more` after the fragment is on the wire.
#[derive(Debug)]
pub struct ResponseWriter<'a> {
    msg: &'a mut MessageState,
    buf: &'a mut IoBuf,
    last: &'a mut bool,
}

impl<'a> ResponseWriter<'a> {
    pub(crate) fn new(msg: &'a mut MessageState, buf: &'a mut IoBuf,
        last: &'a mut bool)
        -> ResponseWriter<'a>
    {
        ResponseWriter { msg, buf, last }
    }

    /// Write the status line with the canonical reason phrase
    pub fn status(&mut self, code: StatusCode) {
        self.msg.response_status(self.buf, code.as_u16(), code.reason());
    }

    /// Write the status line with a custom reason phrase
    pub fn custom_status(&mut self, code: u16, reason: &str) {
        self.msg.response_status(self.buf, code, reason);
    }

    /// Add a header; `Content-Length` must go through `add_length`
    pub fn add_header(&mut self, name: &str, value: &[u8])
        -> Result<(), HeaderError>
    {
        self.msg.add_header(self.buf, name, value)
    }

    /// Add a header with a `Display` value formatted in place
    pub fn format_header<D: std::fmt::Display>(&mut self, name: &str,
        value: D)
        -> Result<(), HeaderError>
    {
        self.msg.format_header(self.buf, name, value)
    }

    /// Add a `Date` header with the current time
    #[cfg(feature = "date_header")]
    pub fn add_date(&mut self) -> Result<(), HeaderError> {
        self.msg.format_header(self.buf, "Date",
            httpdate::fmt_http_date(SystemTime::now()))
    }

    /// Declare the body length; this is the only framing supported
    pub fn add_length(&mut self, n: u64) -> Result<(), HeaderError> {
        self.msg.add_length(self.buf, n)
    }

    /// Close the header section; returns `true` if a body is expected
    pub fn done_headers(&mut self) -> Result<bool, HeaderError> {
        self.msg.done_headers(self.buf)
    }

    /// Append body bytes (counted against the declared length)
    pub fn write_body(&mut self, data: &[u8]) {
        self.msg.write_body(self.buf, data);
    }

    /// True once the header section is complete
    pub fn is_after_headers(&self) -> bool {
        self.msg.is_after_headers()
    }

    /// Mark this fragment as the last one of the response
    ///
    /// # Panics
    ///
    /// Panics when the body is shorter than the declared length; that is
    /// a handler bug, same as the serializer misuse panics.
    pub fn finish(&mut self) {
        self.msg.done();
        *self.last = true;
    }
}
