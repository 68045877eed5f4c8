//! Non-owning iteration over a received header block
//!
//! Everything here is a view into the connection's receive buffer: names
//! and values are slices, nothing is copied or allocated.

use std::str::from_utf8;

use crate::error::ParseError;
use crate::grammar::is_ows;

/// A single `name: value` pair borrowed from the header block
///
/// The value has its leading and trailing spaces and tabs trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub name: &'a str,
    pub value: &'a [u8],
}

/// A view over a header block ending in the blank-line sentinel
///
/// The input may extend past the sentinel (a receive buffer often holds
/// the beginning of the body too); `rest()` returns that tail.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    buf: &'a [u8],
    /// Offset just past the terminating blank line
    end: usize,
}

fn trim_ows(mut val: &[u8]) -> &[u8] {
    while let Some((&first, tail)) = val.split_first() {
        if !is_ows(first) {
            break;
        }
        val = tail;
    }
    while let Some((&last, head)) = val.split_last() {
        if !is_ows(last) {
            break;
        }
        val = head;
    }
    val
}

/// Case-insensitive comparison of a (possibly OWS-padded) list element
/// against a token
fn token_eq(val: &[u8], tok: &str) -> bool {
    let val = trim_ows(val);
    val.len() == tok.len() &&
        val.iter().zip(tok.as_bytes())
            .all(|(&a, &b)| a.eq_ignore_ascii_case(&b))
}

impl<'a> Fields<'a> {
    /// Locate the blank-line sentinel and build the view
    ///
    /// Fails with `InvalidInput` when the input does not contain a
    /// complete header block.
    pub fn new(buf: &'a [u8]) -> Result<Fields<'a>, ParseError> {
        if buf.starts_with(b"\r\n") {
            // no fields at all
            return Ok(Fields { buf, end: 2 });
        }
        match buf.windows(4).position(|w| w == b"\r\n\r\n") {
            Some(pos) => Ok(Fields { buf, end: pos + 4 }),
            None => Err(ParseError::InvalidInput),
        }
    }

    /// Iterate the fields up to the terminating blank line
    pub fn iter(&self) -> FieldIter<'a> {
        FieldIter {
            // everything before the final CRLF, so the terminating blank
            // line shows up as an empty last line
            block: &self.buf[..self.end - 2],
            off: 0,
        }
    }

    /// Bytes past the terminating blank line
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.end..]
    }

    /// Number of bytes up to and including the blank line
    pub fn len(&self) -> usize {
        self.end
    }

    /// The trimmed value of the first field with this name
    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        self.iter()
            .filter_map(|f| f.ok())
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value)
    }

    /// Parse `Content-Length` under the exactly-one-value policy
    ///
    /// Absent header is `Ok(None)`. Repeated headers are accepted only
    /// when byte-identical. The value must be plain ASCII digits: no
    /// sign, no whitespace inside, no empty string. Zero is valid.
    pub fn content_length(&self) -> Result<Option<u64>, ParseError> {
        let mut seen: Option<&[u8]> = None;
        for field in self.iter() {
            let field = field?;
            if !field.name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            match seen {
                Some(prev) if prev != field.value => {
                    return Err(ParseError::InvalidContentLength);
                }
                Some(_) => {}
                None => seen = Some(field.value),
            }
        }
        let value = match seen {
            Some(v) => v,
            None => return Ok(None),
        };
        if value.is_empty() {
            return Err(ParseError::InvalidContentLength);
        }
        let mut total: u64 = 0;
        for &b in value {
            if !b.is_ascii_digit() {
                return Err(ParseError::InvalidContentLength);
            }
            total = total.checked_mul(10)
                .and_then(|t| t.checked_add((b - b'0') as u64))
                .ok_or(ParseError::InvalidContentLength)?;
        }
        Ok(Some(total))
    }

    /// Scan all `Connection` headers for a token, case-insensitively
    ///
    /// Values are comma-separated lists; each element is trimmed before
    /// comparison.
    pub fn has_connection_token(&self, tok: &str) -> bool {
        self.list_has_token("Connection", tok)
    }

    /// True when a `Transfer-Encoding` header names `chunked`
    ///
    /// Chunked framing is not implemented; the server uses this to turn
    /// such requests away early.
    pub fn has_chunked_encoding(&self) -> bool {
        self.list_has_token("Transfer-Encoding", "chunked")
    }

    fn list_has_token(&self, name: &str, tok: &str) -> bool {
        self.iter()
            .filter_map(|f| f.ok())
            .filter(|f| f.name.eq_ignore_ascii_case(name))
            .any(|f| f.value.split(|&b| b == b',')
                 .any(|part| token_eq(part, tok)))
    }
}

/// Iterator over the `name: value` lines of a header block
#[derive(Debug)]
pub struct FieldIter<'a> {
    block: &'a [u8],
    off: usize,
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<Field<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.off >= self.block.len() {
            return None;
        }
        let tail = &self.block[self.off..];
        let line = match tail.windows(2).position(|w| w == b"\r\n") {
            Some(pos) => &tail[..pos],
            None => tail,
        };
        self.off += line.len() + 2;
        if line.is_empty() {
            // terminating blank line
            self.off = self.block.len();
            return None;
        }
        let colon = match line.iter().position(|&b| b == b':') {
            Some(pos) if pos > 0 => pos,
            _ => {
                self.off = self.block.len();
                return Some(Err(ParseError::InvalidField));
            }
        };
        let name = match from_utf8(&line[..colon]) {
            Ok(name) => name,
            Err(_) => {
                self.off = self.block.len();
                return Some(Err(ParseError::InvalidField));
            }
        };
        Some(Ok(Field {
            name,
            value: trim_ows(&line[colon + 1..]),
        }))
    }
}
