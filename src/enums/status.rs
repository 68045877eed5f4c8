use std::fmt;

/// An HTTP status code with its canonical reason phrase
///
/// Any three-digit code is representable; codes outside the well-known
/// table get a default reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const REQUEST_TIMEOUT: StatusCode = StatusCode(408);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const URI_TOO_LONG: StatusCode = StatusCode(414);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const VERSION_NOT_SUPPORTED: StatusCode = StatusCode(505);

    /// Wrap a numeric code
    pub fn new(code: u16) -> StatusCode {
        StatusCode(code)
    }

    /// The numeric code
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// The canonical reason phrase, or `"Unknown"` for unlisted codes
    pub fn reason(&self) -> &'static str {
        match self.0 {
            //  1xx status codes
            100 => "Continue",
            101 => "Switching Protocol",
            //  2xx status codes
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            //  3xx status codes
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            //  4xx status codes
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Payload Too Large",
            414 => "Request-URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Request Range Not Satisfiable",
            417 => "Expectation Failed",
            426 => "Upgrade Required",
            429 => "Too Many Requests",
            //  5xx status codes
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            _ => "Unknown",
        }
    }

    /// Whether a response with this code may carry a body
    ///
    /// All 1xx (Informational), 204 (No Content) and 304 (Not Modified)
    /// responses do not include a message body.
    pub fn allows_body(&self) -> bool {
        !((self.0 >= 100 && self.0 < 200) || self.0 == 204 || self.0 == 304)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

#[cfg(test)]
mod test {
    use super::StatusCode;

    #[test]
    fn well_known() {
        assert_eq!(StatusCode::OK.reason(), "OK");
        assert_eq!(StatusCode::new(404).reason(), "Not Found");
        assert_eq!(StatusCode::VERSION_NOT_SUPPORTED.reason(),
                   "HTTP Version Not Supported");
    }

    #[test]
    fn unknown_gets_default_reason() {
        assert_eq!(StatusCode::new(299).reason(), "Unknown");
        assert_eq!(StatusCode::new(299).to_string(), "299 Unknown");
    }

    #[test]
    fn bodyless_codes() {
        assert!(!StatusCode::new(100).allows_body());
        assert!(!StatusCode::new(204).allows_body());
        assert!(!StatusCode::new(304).allows_body());
        assert!(StatusCode::OK.allows_body());
        assert!(StatusCode::BAD_REQUEST.allows_body());
    }
}
