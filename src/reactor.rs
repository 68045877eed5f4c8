//! The submission interface the protocol cores drive their I/O through
//!
//! An implementation wraps a completion-based reactor (io_uring or a test
//! double). Every submission carries a [`Token`] the reactor hands back
//! verbatim in the matching [`Completion`]; the protocol cores use it to
//! find the connection the event belongs to.
//!
//! Timeouts are part of every data submission rather than separate timer
//! ops: the reactor is expected to link a timer to the data op so that
//! either completing cancels the other, and to report the timed-out case
//! as [`Outcome::Canceled`].

use std::io;
use std::net::SocketAddr;
use std::os::unix::io::RawFd;
use std::time::Duration;

use crate::buffer::IoBuf;

/// Timeout conversion used at every submission site
pub(crate) fn ns(d: Duration) -> u64 {
    d.as_nanos() as u64
}

/// Correlation token passed through the reactor untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(pub u64);

/// Result of a single submission
#[derive(Debug)]
pub enum Outcome {
    /// An accept completed with a new connection
    Accepted(RawFd),
    /// A connect completed
    Connected,
    /// A recv or send moved this many bytes (zero means end of stream)
    Transferred(usize),
    /// The linked timeout fired and the data op was canceled
    Canceled,
    /// The operation failed
    Failed(io::Error),
}

/// A finished submission, delivered by the reactor
///
/// `buf` returns the buffer that was moved into a recv or send
/// submission; it is `None` for accept and connect completions.
#[derive(Debug)]
pub struct Completion {
    pub token: Token,
    pub outcome: Outcome,
    pub buf: Option<IoBuf>,
}

/// Abstract completion-based submission queue
///
/// All methods only enqueue work; results arrive as [`Completion`]s
/// through whatever dispatch loop the embedder runs. The cores guarantee
/// at most one outstanding submission per connection, and never touch a
/// buffer while it is lent to a submission (the buffer moves into the
/// call and comes back in the completion).
pub trait IoQueue {
    /// Accept one connection on a listening socket
    fn accept(&mut self, token: Token, fd: RawFd);

    /// Connect `fd` to `addr`, failing with `Canceled` after the timeout
    fn connect_with_timeout(&mut self, token: Token, fd: RawFd,
        addr: SocketAddr, timeout_ns: u64);

    /// Receive into `buf.writable()`; the completion carries the buffer
    /// back and `Transferred(n)` bytes must be committed with `advance(n)`
    /// by the completion handler
    fn recv_with_timeout(&mut self, token: Token, fd: RawFd, buf: IoBuf,
        timeout_ns: u64);

    /// Send `buf[start..]`; a short write is reported as `Transferred(n)`
    /// with `n` less than the submitted length and is resubmitted by the
    /// caller
    fn send_with_timeout(&mut self, token: Token, fd: RawFd, buf: IoBuf,
        start: usize, timeout_ns: u64);

    /// Close a socket, canceling anything still in flight on it
    ///
    /// Fire and forget: no completion is delivered for the close itself,
    /// and none of the canceled submissions complete afterwards.
    fn close(&mut self, fd: RawFd);
}
