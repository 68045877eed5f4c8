use quick_error::quick_error;

use crate::enums::StatusCode;


quick_error! {
    /// Error of parsing an HTTP/1.x message
    ///
    /// This is produced by the incremental scanners and by the header
    /// field accessors. On the server side every variant maps to a status
    /// code via `status()`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ParseError {
        /// Malformed request line, header line or framing
        BadRequest {
            description("bad request")
        }
        /// Request target longer than the configured limit
        UriTooLong {
            description("request URI too long")
        }
        /// HTTP version missing or not supported at this layer
        VersionNotSupported {
            description("HTTP version not supported")
        }
        /// Header block exceeds the configured buffer limits
        HeaderFieldsTooLong {
            description("header fields too long")
        }
        /// Malformed or conflicting `Content-Length` header
        InvalidContentLength {
            description("invalid content length")
        }
        /// A header line without a colon separator
        InvalidField {
            description("invalid header field")
        }
        /// Input passed to an accessor is not a complete header block
        InvalidInput {
            description("input is not a complete header block")
        }
    }
}

impl ParseError {
    /// The status code a server responds with for this error
    pub fn status(&self) -> StatusCode {
        use self::ParseError::*;
        match *self {
            UriTooLong => StatusCode::URI_TOO_LONG,
            VersionNotSupported => StatusCode::VERSION_NOT_SUPPORTED,
            BadRequest | HeaderFieldsTooLong | InvalidContentLength |
            InvalidField | InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}
