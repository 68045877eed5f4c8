use std::fmt::Display;

use crate::base_serializer::{HeaderError, MessageState};
use crate::buffer::IoBuf;
use crate::enums::Version;


/// Builds request bytes to pass to `Client::send_full`
///
/// A thin shell over the shared message serializer: request line first,
/// then headers, then the body. Misuse (headers after the body, a body
/// without `add_length`, finishing with body bytes missing) panics the
/// same way the server-side writer does.
///
/// ```rust,ignore
/// let mut req = RequestWriter::new();
/// req.request_line("GET", "/", Version::Http11);
/// req.add_header("Host", b"example.com").unwrap();
/// req.done_headers().unwrap();
/// client.send_full(&mut q, req.done())?;
/// ```
#[derive(Debug)]
pub struct RequestWriter {
    msg: MessageState,
    buf: IoBuf,
}

impl RequestWriter {
    pub fn new() -> RequestWriter {
        RequestWriter::with_capacity(1024)
    }

    /// Size the buffer up front when the request body is large
    pub fn with_capacity(cap: usize) -> RequestWriter {
        RequestWriter {
            msg: MessageState::RequestStart,
            buf: IoBuf::with_capacity(cap),
        }
    }

    /// Write the request line
    pub fn request_line(&mut self, method: &str, path: &str,
        version: Version)
    {
        self.msg.request_line(&mut self.buf, method, path, version);
    }

    /// Add a header; `Content-Length` must go through `add_length`
    pub fn add_header(&mut self, name: &str, value: &[u8])
        -> Result<(), HeaderError>
    {
        self.msg.add_header(&mut self.buf, name, value)
    }

    /// Add a header with a `Display` value formatted in place
    pub fn format_header<D: Display>(&mut self, name: &str, value: D)
        -> Result<(), HeaderError>
    {
        self.msg.format_header(&mut self.buf, name, value)
    }

    /// Declare the body length; required for requests with a body
    pub fn add_length(&mut self, n: u64) -> Result<(), HeaderError> {
        self.msg.add_length(&mut self.buf, n)
    }

    /// Close the header section
    pub fn done_headers(&mut self) -> Result<bool, HeaderError> {
        self.msg.done_headers(&mut self.buf)
    }

    /// Append body bytes (counted against the declared length)
    pub fn write_body(&mut self, data: &[u8]) {
        self.msg.write_body(&mut self.buf, data);
    }

    /// Finalize the message and borrow the wire bytes
    ///
    /// # Panics
    ///
    /// Panics when the body is shorter than the declared length.
    pub fn done(&mut self) -> &[u8] {
        self.msg.done();
        &self.buf[..]
    }
}
