use std::fmt;

use crate::error::ParseError;

/// Enum representing HTTP version.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Version {
    /// Version 1.0 of the HTTP protocol
    Http10,
    /// Version 1.1 of the HTTP protocol
    Http11,
    /// Any other well-formed `HTTP/<major>.<minor>`
    ///
    /// This covers versions this layer does not speak: `HTTP/0.9` and
    /// `HTTP/2.0` parse fine but are rejected by the connection state
    /// machines.
    Other(u8, u8),
}

impl Version {
    /// Parse the wire form, e.g. `b"HTTP/1.1"`
    pub fn from_bytes(text: &[u8]) -> Result<Version, ParseError> {
        match text {
            b"HTTP/1.0" => return Ok(Version::Http10),
            b"HTTP/1.1" => return Ok(Version::Http11),
            _ => {}
        }
        // HTTP-version = "HTTP/" DIGIT "." DIGIT
        if text.len() != 8 || &text[..5] != b"HTTP/" || text[6] != b'.' {
            return Err(ParseError::BadRequest);
        }
        let (major, minor) = (text[5], text[7]);
        if !major.is_ascii_digit() || !minor.is_ascii_digit() {
            return Err(ParseError::BadRequest);
        }
        Ok(Version::Other(major - b'0', minor - b'0'))
    }

    /// True for the versions the connection state machines speak
    pub fn is_supported(&self) -> bool {
        matches!(*self, Version::Http10 | Version::Http11)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Version::Http10 => f.write_str("HTTP/1.0"),
            Version::Http11 => f.write_str("HTTP/1.1"),
            Version::Other(major, minor) => {
                write!(f, "HTTP/{}.{}", major, minor)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::Version;
    use crate::error::ParseError;

    #[test]
    fn known_versions() {
        assert_eq!(Version::from_bytes(b"HTTP/1.0").unwrap(),
                   Version::Http10);
        assert_eq!(Version::from_bytes(b"HTTP/1.1").unwrap(),
                   Version::Http11);
    }

    #[test]
    fn unsupported_versions_still_parse() {
        assert_eq!(Version::from_bytes(b"HTTP/0.9").unwrap(),
                   Version::Other(0, 9));
        assert_eq!(Version::from_bytes(b"HTTP/2.0").unwrap(),
                   Version::Other(2, 0));
        assert!(!Version::Other(0, 9).is_supported());
        assert!(!Version::Other(2, 0).is_supported());
    }

    #[test]
    fn garbage() {
        assert_eq!(Version::from_bytes(b"HTTP").unwrap_err(),
                   ParseError::BadRequest);
        assert_eq!(Version::from_bytes(b"HTTP/11").unwrap_err(),
                   ParseError::BadRequest);
        assert_eq!(Version::from_bytes(b"SPDY/1.1").unwrap_err(),
                   ParseError::BadRequest);
        assert_eq!(Version::from_bytes(b"HTTP/1.x").unwrap_err(),
                   ParseError::BadRequest);
    }

    #[test]
    fn round_trip() {
        assert_eq!(Version::Http11.to_string(), "HTTP/1.1");
        assert_eq!(Version::Http10.to_string(), "HTTP/1.0");
        assert_eq!(Version::Other(2, 0).to_string(), "HTTP/2.0");
    }
}
