use std::str::from_utf8;

use crate::enums::{Method, Version};
use crate::error::ParseError;
use crate::headers::Fields;
use crate::scan::RequestLineScanner;


/// A borrowed structure that represents request headers
///
/// It's passed to `Handler::request_headers` and you are free to store or
/// discard any needed fields and headers from it. The borrows point into
/// the connection's receive buffer and stay valid until the response for
/// this request has been fully sent.
///
/// Note, we don't strip hop-by-hop headers (`Connection: close`) and we
/// use them to ensure correctness of the protocol. You must skip them if
/// proxying headers somewhere.
#[derive(Debug)]
pub struct Head<'a> {
    method: Method<'a>,
    uri: &'a str,
    version: Version,
    fields: Fields<'a>,
    content_length: Option<u64>,
    close: bool,
}

/// The keep-alive decision for a parsed request
///
/// HTTP/1.1 connections persist unless a `close` token is present;
/// HTTP/1.0 connections persist only when the client asked with
/// `keep-alive`. Any other version is not spoken at this layer.
pub fn is_keep_alive(version: Version, fields: &Fields)
    -> Result<bool, ParseError>
{
    match version {
        Version::Http11 => Ok(!fields.has_connection_token("close")),
        Version::Http10 => Ok(fields.has_connection_token("keep-alive")),
        Version::Other(..) => Err(ParseError::VersionNotSupported),
    }
}

impl<'a> Head<'a> {
    /// Build the request view over a complete message head
    ///
    /// `buf` must hold at least the bytes the scanner consumed. Rejects
    /// unsupported versions, chunked framing (not implemented) and
    /// malformed `Content-Length` here, so the state machine only ever
    /// sees a self-consistent request.
    pub fn parse(buf: &'a [u8], line: &RequestLineScanner)
        -> Result<Head<'a>, ParseError>
    {
        let method = from_utf8(&buf[..line.method_len()])
            .map_err(|_| ParseError::BadRequest)?;
        let (uri_start, uri_len) = line.uri();
        let uri = from_utf8(&buf[uri_start..uri_start + uri_len])
            .map_err(|_| ParseError::BadRequest)?;
        let (ver_start, ver_len) = line.version();
        let version = Version::from_bytes(
            &buf[ver_start..ver_start + ver_len])?;
        let fields = Fields::new(&buf[line.bytes_read()..])?;
        let close = !is_keep_alive(version, &fields)?;
        if fields.has_chunked_encoding() {
            // chunked framing is a non-goal; turn the request away
            return Err(ParseError::BadRequest);
        }
        let content_length = fields.content_length()?;
        Ok(Head {
            method: Method::from_str(method),
            uri,
            version,
            fields,
            content_length,
            close,
        })
    }

    pub fn method(&self) -> Method<'a> {
        self.method
    }

    pub fn uri(&self) -> &'a str {
        self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The header fields of the request
    pub fn fields(&self) -> &Fields<'a> {
        &self.fields
    }

    /// Value of the `Content-Length` header, if present
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Whether the connection is reused after this request
    pub fn is_keep_alive(&self) -> bool {
        !self.close
    }
}
