use log::trace;

use crate::error::ParseError;
use crate::grammar::{is_field_vchar, is_ows, is_tchar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    OnName,
    OnValue,
    LineCr,
    FinalCr,
    Done,
}

/// Incremental scanner for a header block up to its blank-line terminator
///
/// Validates each line as `field-name ":" OWS field-value OWS CRLF` and
/// completes on the standalone CRLF. It does not record per-field
/// offsets; once the block is complete the [`Fields`](../headers/struct.Fields.html)
/// view iterates it in place. A space between the name and the colon is
/// rejected, as is obsolete line folding.
#[derive(Debug)]
pub struct HeaderBlockScanner {
    state: State,
    read: usize,
    max_len: Option<usize>,
}

impl HeaderBlockScanner {
    pub fn new() -> HeaderBlockScanner {
        HeaderBlockScanner::with_limit(None)
    }

    /// Cap the total block length; the byte exceeding the cap fails with
    /// `HeaderFieldsTooLong`
    pub fn with_limit(max_len: Option<usize>) -> HeaderBlockScanner {
        HeaderBlockScanner {
            state: State::LineStart,
            read: 0,
            max_len,
        }
    }

    /// Total bytes consumed over all `scan` calls, including the blank
    /// line once complete
    pub fn bytes_read(&self) -> usize {
        self.read
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Consume a chunk, returning `true` once the blank line is seen
    pub fn scan(&mut self, chunk: &[u8]) -> Result<bool, ParseError> {
        use self::State::*;
        if self.state == Done {
            return Err(ParseError::BadRequest);
        }
        for &b in chunk {
            self.read += 1;
            if let Some(max) = self.max_len {
                if self.read > max {
                    return Err(ParseError::HeaderFieldsTooLong);
                }
            }
            match self.state {
                LineStart => match b {
                    b'\r' => self.state = FinalCr,
                    b if is_tchar(b) => self.state = OnName,
                    // obs-fold (a line starting with OWS) lands here too
                    _ => return Err(ParseError::BadRequest),
                },
                OnName => match b {
                    b':' => self.state = OnValue,
                    b if is_tchar(b) => {}
                    // `Host : x` has a space before the colon
                    _ => return Err(ParseError::BadRequest),
                },
                OnValue => match b {
                    b'\r' => self.state = LineCr,
                    b if is_field_vchar(b) || is_ows(b) => {}
                    _ => return Err(ParseError::BadRequest),
                },
                LineCr => match b {
                    b'\n' => self.state = LineStart,
                    _ => return Err(ParseError::BadRequest),
                },
                FinalCr => match b {
                    b'\n' => {
                        self.state = Done;
                        trace!("header block complete, {} bytes", self.read);
                        return Ok(true);
                    }
                    _ => return Err(ParseError::BadRequest),
                },
                Done => unreachable!(),
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod test {
    use super::HeaderBlockScanner;
    use crate::error::ParseError;

    #[test]
    fn empty_block() {
        let mut s = HeaderBlockScanner::new();
        assert!(s.scan(b"\r\n").unwrap());
        assert_eq!(s.bytes_read(), 2);
    }

    #[test]
    fn simple_block() {
        let mut s = HeaderBlockScanner::new();
        assert!(s.scan(b"Host: example.com\r\n\r\n").unwrap());
        assert_eq!(s.bytes_read(), 21);
    }

    #[test]
    fn stops_at_blank_line() {
        let mut s = HeaderBlockScanner::new();
        assert!(s.scan(b"A: b\r\n\r\nbody bytes").unwrap());
        assert_eq!(s.bytes_read(), 8);
    }

    #[test]
    fn space_before_colon() {
        let mut s = HeaderBlockScanner::new();
        assert_eq!(s.scan(b"Host : x\r\n\r\n").unwrap_err(),
                   ParseError::BadRequest);
    }

    #[test]
    fn empty_name() {
        let mut s = HeaderBlockScanner::new();
        assert_eq!(s.scan(b": x\r\n\r\n").unwrap_err(),
                   ParseError::BadRequest);
    }

    #[test]
    fn obs_fold_rejected() {
        let mut s = HeaderBlockScanner::new();
        assert_eq!(s.scan(b"A: b\r\n c\r\n\r\n").unwrap_err(),
                   ParseError::BadRequest);
    }

    #[test]
    fn lone_cr_in_value() {
        let mut s = HeaderBlockScanner::new();
        assert_eq!(s.scan(b"A: b\rx\r\n\r\n").unwrap_err(),
                   ParseError::BadRequest);
    }

    #[test]
    fn value_allows_ows_and_obs_text() {
        let mut s = HeaderBlockScanner::new();
        assert!(s.scan(b"A: b\tc \xff\r\n\r\n").unwrap());
    }

    #[test]
    fn cap_is_enforced_at_first_excess_byte() {
        let mut s = HeaderBlockScanner::with_limit(Some(8));
        assert_eq!(s.scan(b"Long: value\r\n\r\n").unwrap_err(),
                   ParseError::HeaderFieldsTooLong);
        assert_eq!(s.bytes_read(), 9);
    }

    #[test]
    fn scan_after_done() {
        let mut s = HeaderBlockScanner::new();
        assert!(s.scan(b"\r\n").unwrap());
        assert_eq!(s.scan(b"\r\n").unwrap_err(), ParseError::BadRequest);
    }

    #[test]
    fn byte_at_a_time() {
        let input = b"Host: a\r\nAccept: */*\r\n\r\n";
        let mut whole = HeaderBlockScanner::new();
        assert!(whole.scan(input).unwrap());

        let mut split = HeaderBlockScanner::new();
        let mut done = false;
        for b in input.iter() {
            done = split.scan(std::slice::from_ref(b)).unwrap();
        }
        assert!(done);
        assert_eq!(split.bytes_read(), whole.bytes_read());
    }
}
