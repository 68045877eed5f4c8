//! This contains common part of serializer between client and server
//! implementation

use std::fmt::Display;
use std::io::Write;

use quick_error::quick_error;

use crate::buffer::IoBuf;
use crate::enums::Version;

quick_error! {
    #[derive(Debug)]
    pub enum HeaderError {
        DuplicateContentLength {
            description("Content-Length is added twice")
        }
        InvalidHeaderName {
            description("Header name contains invalid characters")
        }
        InvalidHeaderValue {
            description("Header value contains invalid characters")
        }
        CantDetermineBodySize {
            description("Content-Length is not present in the headers")
        }
        BodyLengthHeader {
            description("Content-Length must be set \
                using the specialized method")
        }
        RequireBodyless {
            description("This message must not contain body length fields.")
        }
    }
}

/// This is a state of message that is fine both for requests and responses
///
/// Note: while we pass buffer to each method, we expect that the same buffer
/// is passed each time
#[derive(Debug)]
pub enum MessageState {
    /// Nothing has been sent.
    ResponseStart { version: Version, body: Body, close: bool },
    /// Nothing has been sent.
    RequestStart,
    /// Status line is already in the buffer.
    Headers { body: Body, close: bool },
    /// The message contains a fixed size body.
    FixedHeaders { is_head: bool, close: bool, content_length: u64 },
    /// The message contains no body.
    ///
    /// All 1xx (Informational), 204 (No Content),
    /// and 304 (Not Modified) responses do not include a message body.
    Bodyless,
    /// The message contains a body with the given length.
    FixedBody { is_head: bool, content_length: u64 },
    /// A message in final state.
    Done,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Body {
    /// Message contains a body.
    Normal,
    /// Message body is ignored: responses to HEAD requests.
    Head,
    /// Message must not have a body: all 1xx (Informational),
    /// 204 (No Content), and 304 (Not Modified) responses
    Denied,
    /// The message is a request and always contains a body (maybe empty).
    Request,
}

fn invalid_header(value: &[u8]) -> bool {
    value.iter().any(|&x| x == b'\r' || x == b'\n')
}

impl MessageState {
    /// Write status line.
    ///
    /// This puts status line into a buffer immediately. If you don't
    /// continue with the response it will be sent to the network shortly.
    ///
    /// # Panics
    ///
    /// When status line is already written. It's expected that your request
    /// handler state machine will never call the method twice.
    ///
    /// When the status code is 100 (Continue). 100 is not allowed
    /// as a final status code.
    pub fn response_status(&mut self, buf: &mut IoBuf, code: u16,
        reason: &str)
    {
        use self::Body::*;
        use self::MessageState::*;
        match *self {
            ResponseStart { version, mut body, close } => {
                // 100 (Continue) interim status code is not allowed as
                // a final response status.
                assert!(code != 100);
                write!(buf, "{} {} {}\r\n", version, code, reason).unwrap();
                // Responses without body:
                //
                // * 1xx (Informational)
                // * 204 (No Content)
                // * 304 (Not Modified)
                if (code >= 100 && code < 200) || code == 204 || code == 304 {
                    body = Denied
                }
                *self = Headers { body, close };
            }
            ref state => {
                panic!("Called response_status() method on response \
                    in state {:?}", state)
            }
        }
    }

    /// Write request line.
    ///
    /// This puts request line into a buffer immediately. If you don't
    /// continue with the request it will be sent to the network shortly.
    ///
    /// # Panics
    ///
    /// When request line is already written. It's expected that your request
    /// handler state machine will never call the method twice.
    pub fn request_line(&mut self, buf: &mut IoBuf,
        method: &str, path: &str, version: Version)
    {
        use self::Body::*;
        use self::MessageState::*;
        match *self {
            RequestStart => {
                write!(buf, "{} {} {}\r\n", method, path, version).unwrap();
                // All requests may contain a body although it is uncommon
                // for GET and HEAD requests to contain one.
                *self = Headers { body: Request, close: false };
            }
            ref state => {
                panic!("Called request_line() method on request in state {:?}",
                       state)
            }
        }
    }

    fn write_header(&mut self, buf: &mut IoBuf, name: &str, value: &[u8])
        -> Result<(), HeaderError>
    {
        if invalid_header(name.as_bytes()) {
            return Err(HeaderError::InvalidHeaderName);
        }
        if invalid_header(value) {
            return Err(HeaderError::InvalidHeaderValue);
        }
        buf.extend(name.as_bytes());
        buf.extend(b": ");
        buf.extend(value);
        buf.extend(b"\r\n");
        Ok(())
    }

    fn write_formatted<D: Display>(&mut self, buf: &mut IoBuf,
        name: &str, value: D)
        -> Result<(), HeaderError>
    {
        if invalid_header(name.as_bytes()) {
            return Err(HeaderError::InvalidHeaderName);
        }
        let start = buf.len();
        buf.extend(name.as_bytes());
        buf.extend(b": ");
        let value_start = buf.len();
        write!(buf, "{}", value).unwrap();
        if invalid_header(&buf[value_start..]) {
            buf.truncate(start);
            return Err(HeaderError::InvalidHeaderValue);
        }
        buf.extend(b"\r\n");
        Ok(())
    }

    /// Add a header to the message.
    ///
    /// Header is written into the output buffer immediately.
    ///
    /// `Content-Length` header must be set using the `add_length` method.
    /// This header is important for the security of HTTP.
    ///
    /// We return Result here to make implementing proxies easier. In the
    /// application handler it's okay to unwrap the result and to get
    /// a meaningful panic (that is basically an assertion).
    ///
    /// # Panics
    ///
    /// Panics when `add_header` is called in the wrong state.
    pub fn add_header(&mut self, buf: &mut IoBuf, name: &str, value: &[u8])
        -> Result<(), HeaderError>
    {
        use self::HeaderError::*;
        use self::MessageState::*;
        if name.eq_ignore_ascii_case("Content-Length")
            || name.eq_ignore_ascii_case("Transfer-Encoding") {
            return Err(BodyLengthHeader)
        }
        match *self {
            Headers { .. } | FixedHeaders { .. } => {
                self.write_header(buf, name, value)
            }
            ref state => {
                panic!("Called add_header() method on a message in state {:?}",
                       state)
            }
        }
    }

    /// Same as `add_header` but allows value to be formatted directly into
    /// the buffer
    ///
    /// Useful for dates and numeric headers, as well as some strongly typed
    /// wrappers
    pub fn format_header<D: Display>(&mut self, buf: &mut IoBuf,
        name: &str, value: D)
        -> Result<(), HeaderError>
    {
        use self::HeaderError::*;
        use self::MessageState::*;
        if name.eq_ignore_ascii_case("Content-Length")
            || name.eq_ignore_ascii_case("Transfer-Encoding") {
            return Err(BodyLengthHeader)
        }
        match *self {
            Headers { .. } | FixedHeaders { .. } => {
                self.write_formatted(buf, name, value)
            }
            ref state => {
                panic!("Called format_header() method on a message \
                    in state {:?}", state)
            }
        }
    }

    /// Add a content length to the message.
    ///
    /// The `Content-Length` header is written to the output buffer
    /// immediately. It is checked that no other body length header is
    /// present in the message. When the body is sent the length is
    /// validated.
    ///
    /// # Panics
    ///
    /// Panics when `add_length` is called in the wrong state.
    pub fn add_length(&mut self, buf: &mut IoBuf, n: u64)
        -> Result<(), HeaderError>
    {
        use self::Body::*;
        use self::HeaderError::*;
        use self::MessageState::*;
        match *self {
            FixedHeaders { .. } => Err(DuplicateContentLength),
            Headers { body: Denied, .. } => Err(RequireBodyless),
            Headers { body, close } => {
                self.write_formatted(buf, "Content-Length", n)?;
                *self = FixedHeaders { is_head: body == Head,
                                      close,
                                      content_length: n };
                Ok(())
            }
            ref state => {
                panic!("Called add_length() method on message in state {:?}",
                       state)
            }
        }
    }

    /// Returns true if at least `response_status()` has been called
    ///
    /// This is mostly useful to find out whether we can build an error
    /// page or it's already too late.
    pub fn is_started(&self) -> bool {
        !matches!(*self,
            MessageState::RequestStart |
            MessageState::ResponseStart { .. })
    }

    /// Closes the HTTP header and returns `true` if entity body is expected.
    ///
    /// Specifically `false` is returned when status is 1xx, 204, 304 or in
    /// the response to a `HEAD` request but not if the body has zero-length.
    ///
    /// Similarly to `add_header()` it's fine to `unwrap()` here, unless
    /// you're doing some proxying.
    ///
    /// # Panics
    ///
    /// Panics when the response is in a wrong state.
    pub fn done_headers(&mut self, buf: &mut IoBuf)
        -> Result<bool, HeaderError>
    {
        use self::Body::*;
        use self::MessageState::*;
        if matches!(*self,
                    Headers { close: true, .. } |
                    FixedHeaders { close: true, .. }) {
            self.write_header(buf, "Connection", b"close").unwrap();
        }
        let expect_body = match *self {
            Headers { body: Denied, .. } => {
                *self = Bodyless;
                false
            }
            Headers { body: Request, .. } => {
                *self = FixedBody { is_head: false, content_length: 0 };
                true
            }
            Headers { body: Normal, .. } => {
                return Err(HeaderError::CantDetermineBodySize);
            }
            Headers { body: Head, .. } => {
                return Err(HeaderError::CantDetermineBodySize);
            }
            FixedHeaders { is_head, content_length, .. } => {
                *self = FixedBody { is_head, content_length };
                !is_head
            }
            ref state => {
                panic!("Called done_headers() method on message \
                    in state {:?}", state)
            }
        };
        buf.extend(b"\r\n");
        Ok(expect_body)
    }

    /// Write a chunk of the message body.
    ///
    /// The chunk is put into the buffer, but is only sent when the
    /// connection state machine submits it. So you may put multiple
    /// chunks into the buffer quite efficiently.
    ///
    /// You may write a body in responses to HEAD requests just like in
    /// real requests but the data is not sent to the network. Of course
    /// it is more efficient to not construct the message body at all.
    ///
    /// # Panics
    ///
    /// When response is in wrong state. Or there is no header which
    /// determines the body length (Content-Length).
    pub fn write_body(&mut self, buf: &mut IoBuf, data: &[u8]) {
        use self::MessageState::*;
        match *self {
            Bodyless => panic!("Message must not contain body."),
            FixedBody { is_head, ref mut content_length } => {
                if data.len() as u64 > *content_length {
                    panic!("Fixed size response error. \
                        Bytes left {} but got additional {}",
                        content_length, data.len());
                }
                if !is_head {
                    buf.extend(data);
                }
                *content_length -= data.len() as u64;
            }
            ref state => {
                panic!("Called write_body() method on message \
                    in state {:?}", state)
            }
        }
    }

    /// Returns true if headers are already sent (buffered)
    pub fn is_after_headers(&self) -> bool {
        use self::MessageState::*;
        matches!(*self, Bodyless | Done | FixedBody {..})
    }

    /// Returns true if `done()` method is already called
    pub fn is_complete(&self) -> bool {
        matches!(*self, MessageState::Done)
    }

    /// Asserts that the message is in the appropriate state to be
    /// finished and marks it done.
    ///
    /// The method may be called multiple times.
    ///
    /// # Panics
    ///
    /// When the message is in the wrong state or the body is not finished.
    pub fn done(&mut self) {
        use self::MessageState::*;
        match *self {
            Bodyless => *self = Done,
            // Don't check responses to HEAD requests if body was
            // actually sent.
            FixedBody { is_head: true, .. } => *self = Done,
            FixedBody { is_head: false, content_length: 0 } => *self = Done,
            FixedBody { is_head: false, content_length } => {
                panic!("Tried to close message with {} bytes remaining.",
                       content_length)
            }
            Done => {}  // multiple invocations are okay.
            ref state => {
                panic!("Called done() method on response in state {:?}",
                       state);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Body, MessageState};
    use crate::buffer::IoBuf;
    use crate::enums::Version;

    fn do_request<F>(fun: F) -> IoBuf
        where F: FnOnce(MessageState, &mut IoBuf)
    {
        let mut buf = IoBuf::with_capacity(1024);
        fun(MessageState::RequestStart, &mut buf);
        buf
    }
    fn do_response10<F>(fun: F) -> IoBuf
        where F: FnOnce(MessageState, &mut IoBuf)
    {
        let mut buf = IoBuf::with_capacity(1024);
        fun(MessageState::ResponseStart {
            version: Version::Http10,
            body: Body::Normal,
            close: false,
        }, &mut buf);
        buf
    }
    fn do_response11<F>(close: bool, fun: F) -> IoBuf
        where F: FnOnce(MessageState, &mut IoBuf)
    {
        let mut buf = IoBuf::with_capacity(1024);
        fun(MessageState::ResponseStart {
            version: Version::Http11,
            body: Body::Normal,
            close,
        }, &mut buf);
        buf
    }

    fn do_head_response11<F>(close: bool, fun: F) -> IoBuf
        where F: FnOnce(MessageState, &mut IoBuf)
    {
        let mut buf = IoBuf::with_capacity(1024);
        fun(MessageState::ResponseStart {
            version: Version::Http11,
            body: Body::Head,
            close,
        }, &mut buf);
        buf
    }

    #[test]
    fn minimal_request() {
        assert_eq!(&do_request(|mut msg, buf| {
            msg.request_line(buf, "GET", "/", Version::Http10);
            msg.done_headers(buf).unwrap();
        })[..], "GET / HTTP/1.0\r\n\r\n".as_bytes());
    }

    #[test]
    fn minimal_response() {
        assert_eq!(&do_response10(|mut msg, buf| {
            msg.response_status(buf, 200, "OK");
            msg.add_length(buf, 0).unwrap();
            msg.done_headers(buf).unwrap();
        })[..], "HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n".as_bytes());
    }

    #[test]
    fn close_response11() {
        assert_eq!(&do_response11(true, |mut msg, buf| {
            msg.response_status(buf, 200, "OK");
            msg.add_length(buf, 0).unwrap();
            msg.done_headers(buf).unwrap();
        })[..], concat!("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n",
                        "Connection: close\r\n\r\n").as_bytes());
    }

    #[test]
    fn head_request() {
        assert_eq!(&do_request(|mut msg, buf| {
            msg.request_line(buf, "HEAD", "/", Version::Http11);
            msg.add_length(buf, 5).unwrap();
            msg.done_headers(buf).unwrap();
            msg.write_body(buf, b"Hello");
        })[..], "HEAD / HTTP/1.1\r\nContent-Length: 5\r\n\r\nHello".as_bytes());
    }

    #[test]
    fn head_response() {
        // The response to a HEAD request may contain the real body length.
        assert_eq!(&do_head_response11(false, |mut msg, buf| {
            msg.response_status(buf, 200, "OK");
            msg.add_length(buf, 500).unwrap();
            msg.done_headers(buf).unwrap();
        })[..], "HTTP/1.1 200 OK\r\nContent-Length: 500\r\n\r\n".as_bytes());
    }

    #[test]
    fn informational_response() {
        // No response with an 1xx status code may contain a body length.
        assert_eq!(&do_response11(false, |mut msg, buf| {
            msg.response_status(buf, 142, "Foo");
            msg.add_length(buf, 500).unwrap_err();
            msg.done_headers(buf).unwrap();
        })[..], "HTTP/1.1 142 Foo\r\n\r\n".as_bytes());
    }

    #[test]
    fn full_body_cycle() {
        let buf = do_response11(false, |mut msg, buf| {
            msg.response_status(buf, 200, "OK");
            msg.add_length(buf, 5).unwrap();
            assert!(msg.done_headers(buf).unwrap());
            msg.write_body(buf, b"He");
            msg.write_body(buf, b"llo");
            msg.done();
            assert!(msg.is_complete());
        });
        assert_eq!(&buf[..],
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHello".as_bytes());
    }
}
