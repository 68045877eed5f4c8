use std::str::from_utf8;

use crate::enums::{StatusCode, Version};
use crate::error::ParseError;
use crate::headers::Fields;
use crate::scan::StatusLineScanner;


/// A borrowed structure that represents response headers
///
/// It's passed back from `Client::head` and you are free to store or
/// discard any needed fields and headers from it. The borrows point into
/// the client's receive buffer and die on the next call that reads body
/// content.
#[derive(Debug)]
pub struct Head<'a> {
    code: StatusCode,
    reason: &'a str,
    version: Version,
    fields: Fields<'a>,
}

impl<'a> Head<'a> {
    /// Build the response view over a complete message head
    pub fn parse(buf: &'a [u8], line: &StatusLineScanner)
        -> Result<Head<'a>, ParseError>
    {
        let (ver_start, ver_len) = line.version();
        let version = Version::from_bytes(
            &buf[ver_start..ver_start + ver_len])?;
        if !version.is_supported() {
            return Err(ParseError::VersionNotSupported);
        }
        let digits = &buf[line.code_start()..line.code_start() + 3];
        let code = digits.iter()
            .fold(0u16, |code, &d| code * 10 + (d - b'0') as u16);
        let (reason_start, reason_len) = line.reason();
        let reason = from_utf8(&buf[reason_start..reason_start + reason_len])
            .map_err(|_| ParseError::BadRequest)?;
        let fields = Fields::new(&buf[line.bytes_read()..])?;
        Ok(Head {
            code: StatusCode::new(code),
            reason,
            version,
            fields,
        })
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    /// The reason phrase as sent by the server (may differ from the
    /// canonical one)
    pub fn reason(&self) -> &'a str {
        self.reason
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The header fields of the response
    pub fn fields(&self) -> &Fields<'a> {
        &self.fields
    }

    /// Whether the server will keep the connection open
    pub fn is_keep_alive(&self) -> bool {
        match self.version {
            Version::Http11 => !self.fields.has_connection_token("close"),
            Version::Http10 => self.fields.has_connection_token("keep-alive"),
            Version::Other(..) => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Head;
    use crate::enums::Version;
    use crate::error::ParseError;
    use crate::scan::ResponseScanner;

    fn parse(input: &[u8]) -> Result<Head, ParseError> {
        let mut scanner = ResponseScanner::new();
        assert!(scanner.scan(input).unwrap());
        Head::parse(input, scanner.line())
    }

    #[test]
    fn simple_response() {
        let head = parse(
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n").unwrap();
        assert_eq!(head.code().as_u16(), 200);
        assert_eq!(head.reason(), "OK");
        assert_eq!(head.version(), Version::Http11);
        assert!(head.is_keep_alive());
        assert_eq!(head.fields().content_length().unwrap(), Some(5));
    }

    #[test]
    fn close_response() {
        let head = parse(
            b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n").unwrap();
        assert!(!head.is_keep_alive());
    }

    #[test]
    fn unsupported_version() {
        assert_eq!(parse(b"HTTP/2.0 200 OK\r\n\r\n").unwrap_err(),
                   ParseError::VersionNotSupported);
    }

    #[test]
    fn nonstandard_reason_preserved() {
        let head = parse(b"HTTP/1.1 404 Nope\r\n\r\n").unwrap();
        assert_eq!(head.reason(), "Nope");
        assert_eq!(head.code().reason(), "Not Found");
    }
}
