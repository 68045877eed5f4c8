//! Incremental, resumable scanners for HTTP/1.x message heads
//!
//! Each scanner is a small deterministic state machine: feed it chunks of
//! any size (including empty) and it reports `Ok(true)` exactly when its
//! terminal sentinel was observed, `Ok(false)` when it needs more input,
//! or a precise [`ParseError`](../enum.ParseError.html). Splitting the
//! same input differently never changes the final state or the recorded
//! offsets, and scanning past completion is reported as `BadRequest`.
//!
//! [`RequestScanner`] and [`ResponseScanner`] compose a start-line
//! scanner with the header-block scanner so a connection can feed every
//! received chunk to a single object.

mod request_line;
mod status_line;
mod header_block;

pub use self::header_block::HeaderBlockScanner;
pub use self::request_line::{RequestLineScanner, DEFAULT_METHOD_MAX,
                             DEFAULT_URI_MAX, VERSION_MAX};
pub use self::status_line::{StatusLineScanner, DEFAULT_REASON_MAX};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Line,
    Block,
    Done,
}

/// Request line followed by a header block
///
/// `scan` hands the tail of a chunk to the header-block scanner in the
/// same call when the request line completes mid-chunk.
#[derive(Debug)]
pub struct RequestScanner {
    line: RequestLineScanner,
    block: HeaderBlockScanner,
    phase: Phase,
}

impl RequestScanner {
    pub fn new() -> RequestScanner {
        RequestScanner {
            line: RequestLineScanner::new(),
            block: HeaderBlockScanner::new(),
            phase: Phase::Line,
        }
    }

    pub fn with_scanners(line: RequestLineScanner, block: HeaderBlockScanner)
        -> RequestScanner
    {
        RequestScanner { line, block, phase: Phase::Line }
    }

    /// The request-line scanner with its recorded offsets
    pub fn line(&self) -> &RequestLineScanner {
        &self.line
    }

    /// Offset of the header block within the message head
    pub fn block_start(&self) -> usize {
        self.line.bytes_read()
    }

    /// Total bytes of the message head once `scan` returned `true`
    pub fn head_len(&self) -> usize {
        self.line.bytes_read() + self.block.bytes_read()
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn scan(&mut self, chunk: &[u8]) -> Result<bool, ParseError> {
        match self.phase {
            Phase::Line => {
                let before = self.line.bytes_read();
                if !self.line.scan(chunk)? {
                    return Ok(false);
                }
                self.phase = Phase::Block;
                let used = self.line.bytes_read() - before;
                self.scan(&chunk[used..])
            }
            Phase::Block => {
                if !self.block.scan(chunk)? {
                    return Ok(false);
                }
                self.phase = Phase::Done;
                Ok(true)
            }
            Phase::Done => Err(ParseError::BadRequest),
        }
    }
}

/// Status line followed by a header block
#[derive(Debug)]
pub struct ResponseScanner {
    line: StatusLineScanner,
    block: HeaderBlockScanner,
    phase: Phase,
}

impl ResponseScanner {
    pub fn new() -> ResponseScanner {
        ResponseScanner {
            line: StatusLineScanner::new(),
            block: HeaderBlockScanner::new(),
            phase: Phase::Line,
        }
    }

    pub fn with_scanners(line: StatusLineScanner, block: HeaderBlockScanner)
        -> ResponseScanner
    {
        ResponseScanner { line, block, phase: Phase::Line }
    }

    /// The status-line scanner with its recorded offsets
    pub fn line(&self) -> &StatusLineScanner {
        &self.line
    }

    /// Offset of the header block within the message head
    pub fn block_start(&self) -> usize {
        self.line.bytes_read()
    }

    /// Total bytes of the message head once `scan` returned `true`
    pub fn head_len(&self) -> usize {
        self.line.bytes_read() + self.block.bytes_read()
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn scan(&mut self, chunk: &[u8]) -> Result<bool, ParseError> {
        match self.phase {
            Phase::Line => {
                let before = self.line.bytes_read();
                if !self.line.scan(chunk)? {
                    return Ok(false);
                }
                self.phase = Phase::Block;
                let used = self.line.bytes_read() - before;
                self.scan(&chunk[used..])
            }
            Phase::Block => {
                if !self.block.scan(chunk)? {
                    return Ok(false);
                }
                self.phase = Phase::Done;
                Ok(true)
            }
            Phase::Done => Err(ParseError::BadRequest),
        }
    }
}
