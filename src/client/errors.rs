use std::io;

use quick_error::quick_error;

use crate::error::ParseError;


quick_error! {
    /// Client request error
    #[derive(Debug)]
    pub enum Error {
        /// I/O (basically networking) error occured during request
        Io(err: io::Error) {
            description("IO error")
            display("IO error: {}", err)
            from()
        }
        /// The linked timeout fired before the operation finished
        Canceled {
            description("operation timed out")
        }
        /// Connection closed in the middle of a response
        UnexpectedEof {
            description("connection closed prematurely")
        }
        /// Malformed status line or header block
        InvalidResponse(err: ParseError) {
            description("bad response")
            display("bad response: {}", err)
        }
        /// Response head does not fit `response_header_buf_max_len`
        HeaderFieldsTooLong {
            description("response header fields too long")
        }
        /// Malformed or conflicting `Content-Length` header
        InvalidContentLength {
            description("invalid content length")
        }
        /// The server speaks an HTTP version this layer does not
        VersionNotSupported {
            description("HTTP version not supported")
        }
        /// This means connection is busy: the requested operation does
        /// not fit the current phase or another one is still in flight
        Busy {
            description("operation doesn't fit the connection state")
        }
        /// Connection closed normally
        ///
        /// This error should be catched by a connection pool and not
        /// shown to the end users
        Closed {
            description("connection closed normally")
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        match err {
            ParseError::HeaderFieldsTooLong => Error::HeaderFieldsTooLong,
            ParseError::VersionNotSupported => Error::VersionNotSupported,
            ParseError::InvalidContentLength => Error::InvalidContentLength,
            err => Error::InvalidResponse(err),
        }
    }
}
