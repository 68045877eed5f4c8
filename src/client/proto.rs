use std::cmp::min;
use std::net::SocketAddr;
use std::os::unix::io::RawFd;
use std::sync::Arc;

use log::{debug, trace};

use crate::buffer::IoBuf;
use crate::reactor::{ns, Completion, IoQueue, Outcome, Token};
use crate::scan::ResponseScanner;

use super::head::Head;
use super::{Config, Error};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial,
    Connecting,
    Sending,
    ReceivingHeaders,
    ReceivingContent,
    Idle,
    Closed,
}

/// What a completion amounted to for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More I/O was submitted internally (short write, header buffer
    /// growth, incomplete header block); nothing for the caller yet
    Pending,
    /// The connection is established
    Connected,
    /// Everything passed to `send_full` is on the wire
    Sent,
    /// The response head is parsed; see `head()` and `fragment()`
    Headers,
    /// A body fragment arrived; `last` mirrors
    /// `fully_read_response_content()`
    Content { last: bool },
}

/// A low-level HTTP/1.x client protocol handler
///
/// Drives one connection through connect, send, receive-headers and
/// receive-body phases. Every method only submits work; results come
/// back through [`handle`](#method.handle). At most one operation is in
/// flight at a time; a second submission is refused with `Busy`.
///
/// An `Err` from `handle` leaves the connection unusable; call
/// [`close`](#method.close) to release the socket.
pub struct Client {
    cfg: Arc<Config>,
    fd: RawFd,
    token: Token,
    phase: Phase,
    pending: bool,
    scanner: ResponseScanner,
    recv_buf: Option<IoBuf>,
    send_buf: Option<IoBuf>,
    send_processed: usize,
    fed: usize,
    head_len: usize,
    head_done: bool,
    content_length: Option<u64>,
    content_read: u64,
    frag: (usize, usize),
}

impl Client {
    /// Wrap a fresh (not yet connected) socket
    ///
    /// The token is attached to every submission this client makes, so
    /// the embedder can route completions of several clients.
    pub fn new(fd: RawFd, token: Token, cfg: &Arc<Config>) -> Client {
        Client {
            cfg: cfg.clone(),
            fd,
            token,
            phase: Phase::Initial,
            pending: false,
            scanner: ResponseScanner::new(),
            recv_buf: Some(IoBuf::with_capacity(
                cfg.response_header_buf_ini_len)),
            send_buf: Some(IoBuf::with_capacity(cfg.send_buf_len)),
            send_processed: 0,
            fed: 0,
            head_len: 0,
            head_done: false,
            content_length: None,
            content_read: 0,
            frag: (0, 0),
        }
    }

    /// Establish the connection
    pub fn connect<Q: IoQueue>(&mut self, q: &mut Q, addr: SocketAddr)
        -> Result<(), Error>
    {
        if self.phase != Phase::Initial || self.pending {
            return Err(Error::Busy);
        }
        self.phase = Phase::Connecting;
        self.pending = true;
        q.connect_with_timeout(self.token, self.fd, addr,
            ns(self.cfg.connect_timeout));
        Ok(())
    }

    /// Send all of `bytes`, resubmitting short writes internally
    ///
    /// The bytes are copied into the send buffer, so the caller's slice
    /// is free right away. Several `send_full` calls in a row are fine
    /// (request head first, body next); each completes with
    /// `Progress::Sent` before the next may start.
    pub fn send_full<Q: IoQueue>(&mut self, q: &mut Q, bytes: &[u8])
        -> Result<(), Error>
    {
        if !matches!(self.phase, Phase::Idle | Phase::Initial)
            || self.pending
        {
            return Err(Error::Busy);
        }
        let mut buf = self.send_buf.take().ok_or(Error::Busy)?;
        buf.clear();
        buf.extend(bytes);
        self.send_processed = 0;
        self.phase = Phase::Sending;
        self.pending = true;
        q.send_with_timeout(self.token, self.fd, buf, 0,
            ns(self.cfg.send_timeout));
        Ok(())
    }

    /// Start reading a response head
    pub fn recv_response_header<Q: IoQueue>(&mut self, q: &mut Q)
        -> Result<(), Error>
    {
        if !matches!(self.phase, Phase::Idle | Phase::Initial)
            || self.pending
        {
            return Err(Error::Busy);
        }
        self.scanner = ResponseScanner::new();
        self.fed = 0;
        self.head_len = 0;
        self.head_done = false;
        self.content_length = None;
        self.content_read = 0;
        self.frag = (0, 0);
        if let Some(buf) = self.recv_buf.as_mut() {
            buf.clear();
        }
        self.phase = Phase::ReceivingHeaders;
        self.submit_recv(q);
        Ok(())
    }

    /// Pull the next body fragment
    ///
    /// Valid only while `fully_read_response_content()` is false; the
    /// response head borrows die here because the buffer is reused.
    pub fn recv_content_fragment<Q: IoQueue>(&mut self, q: &mut Q)
        -> Result<(), Error>
    {
        if self.phase != Phase::ReceivingContent || self.pending
            || self.fully_read_response_content()
        {
            return Err(Error::Busy);
        }
        if let Some(buf) = self.recv_buf.as_mut() {
            buf.clear();
        }
        self.head_len = 0;
        self.frag = (0, 0);
        self.submit_recv(q);
        Ok(())
    }

    /// Release the socket
    pub fn close<Q: IoQueue>(&mut self, q: &mut Q) {
        if self.phase != Phase::Closed {
            debug!("client fd {}: closing", self.fd);
            q.close(self.fd);
            self.phase = Phase::Closed;
            self.pending = false;
        }
    }

    fn submit_recv<Q: IoQueue>(&mut self, q: &mut Q) {
        let buf = self.recv_buf.take().expect("recv buffer is present");
        self.pending = true;
        q.recv_with_timeout(self.token, self.fd, buf,
            ns(self.cfg.recv_timeout));
    }

    /// Advance the state machine with a completion for this client
    pub fn handle<Q: IoQueue>(&mut self, q: &mut Q, completion: Completion)
        -> Result<Progress, Error>
    {
        let Completion { token, outcome, buf } = completion;
        if token != self.token {
            trace!("client fd {}: foreign completion dropped", self.fd);
            return Ok(Progress::Pending);
        }
        self.pending = false;
        match self.phase {
            Phase::Connecting => self.connect_event(outcome),
            Phase::Sending => self.send_event(q, outcome, buf),
            Phase::ReceivingHeaders => self.headers_event(q, outcome, buf),
            Phase::ReceivingContent => self.content_event(outcome, buf),
            Phase::Initial | Phase::Idle | Phase::Closed => {
                trace!("client fd {}: completion in phase {:?} dropped",
                       self.fd, self.phase);
                Ok(Progress::Pending)
            }
        }
    }

    fn connect_event(&mut self, outcome: Outcome) -> Result<Progress, Error> {
        match outcome {
            Outcome::Connected => {
                debug!("client fd {}: connected", self.fd);
                self.phase = Phase::Idle;
                Ok(Progress::Connected)
            }
            Outcome::Canceled => {
                self.phase = Phase::Closed;
                Err(Error::Canceled)
            }
            Outcome::Failed(e) => {
                self.phase = Phase::Closed;
                Err(Error::Io(e))
            }
            _ => {
                self.phase = Phase::Closed;
                Err(Error::Busy)
            }
        }
    }

    fn send_event<Q: IoQueue>(&mut self, q: &mut Q, outcome: Outcome,
        buf: Option<IoBuf>)
        -> Result<Progress, Error>
    {
        let buf = buf.expect("send completion returns the buffer");
        self.send_buf = Some(buf);
        match outcome {
            Outcome::Transferred(n) => {
                self.send_processed += n;
                let total = self.send_buf.as_ref()
                    .expect("send buffer is present").len();
                if self.send_processed < total {
                    trace!("client fd {}: short write, {}/{} sent",
                           self.fd, self.send_processed, total);
                    let buf = self.send_buf.take()
                        .expect("send buffer is present");
                    self.pending = true;
                    q.send_with_timeout(self.token, self.fd, buf,
                        self.send_processed, ns(self.cfg.send_timeout));
                    Ok(Progress::Pending)
                } else {
                    self.phase = Phase::Idle;
                    Ok(Progress::Sent)
                }
            }
            Outcome::Canceled => {
                self.phase = Phase::Closed;
                Err(Error::Canceled)
            }
            Outcome::Failed(e) => {
                self.phase = Phase::Closed;
                Err(Error::Io(e))
            }
            _ => {
                self.phase = Phase::Closed;
                Err(Error::Busy)
            }
        }
    }

    fn headers_event<Q: IoQueue>(&mut self, q: &mut Q, outcome: Outcome,
        buf: Option<IoBuf>)
        -> Result<Progress, Error>
    {
        let mut buf = buf.expect("recv completion returns the buffer");
        match outcome {
            Outcome::Transferred(0) => {
                let partial = !buf.is_empty();
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                if partial {
                    Err(Error::UnexpectedEof)
                } else {
                    Err(Error::Closed)
                }
            }
            Outcome::Transferred(n) => {
                buf.advance(n);
                self.recv_buf = Some(buf);
                self.feed_headers(q)
            }
            Outcome::Canceled => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Canceled)
            }
            Outcome::Failed(e) => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Io(e))
            }
            _ => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Busy)
            }
        }
    }

    fn feed_headers<Q: IoQueue>(&mut self, q: &mut Q)
        -> Result<Progress, Error>
    {
        let res = {
            let buf = self.recv_buf.as_ref().expect("recv buffer is present");
            let res = self.scanner.scan(&buf[self.fed..]);
            self.fed = buf.len();
            res
        };
        match res {
            Err(e) => {
                debug!("client fd {}: bad response: {}", self.fd, e);
                self.phase = Phase::Closed;
                Err(e.into())
            }
            Ok(false) => {
                {
                    let ini = self.cfg.response_header_buf_ini_len;
                    let max = self.cfg.response_header_buf_max_len;
                    let buf = self.recv_buf.as_mut()
                        .expect("recv buffer is present");
                    if buf.is_full() {
                        if buf.capacity() >= max {
                            self.phase = Phase::Closed;
                            return Err(Error::HeaderFieldsTooLong);
                        }
                        let new_cap = min(buf.capacity() + ini, max);
                        trace!("client fd {}: header buffer {} -> {}",
                               self.fd, buf.capacity(), new_cap);
                        buf.grow(new_cap);
                    }
                }
                self.submit_recv(q);
                Ok(Progress::Pending)
            }
            Ok(true) => {
                self.head_len = self.scanner.head_len();
                let parsed = {
                    let buf = self.recv_buf.as_ref()
                        .expect("recv buffer is present");
                    Head::parse(&buf[..self.head_len], self.scanner.line())
                        .and_then(|head| head.fields().content_length())
                        .map(|cl| (cl, buf.len() - self.head_len))
                };
                let (content_length, prefix) = match parsed {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        debug!("client fd {}: bad response: {}", self.fd, e);
                        self.phase = Phase::Closed;
                        return Err(e.into());
                    }
                };
                self.head_done = true;
                self.content_length = content_length;
                let take = match content_length {
                    Some(cl) => min(prefix as u64, cl) as usize,
                    None => 0,
                };
                self.frag = (self.head_len, take);
                self.content_read = take as u64;
                self.phase = if self.fully_read_response_content() {
                    Phase::Idle
                } else {
                    Phase::ReceivingContent
                };
                Ok(Progress::Headers)
            }
        }
    }

    fn content_event(&mut self, outcome: Outcome, buf: Option<IoBuf>)
        -> Result<Progress, Error>
    {
        let mut buf = buf.expect("recv completion returns the buffer");
        match outcome {
            Outcome::Transferred(0) => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::UnexpectedEof)
            }
            Outcome::Transferred(n) => {
                buf.advance(n);
                self.recv_buf = Some(buf);
                let remaining = self.content_length
                    .expect("body phase implies a known length")
                    - self.content_read;
                let take = min(n as u64, remaining) as usize;
                self.content_read += take as u64;
                self.frag = (0, take);
                let last = self.fully_read_response_content();
                if last {
                    self.phase = Phase::Idle;
                }
                Ok(Progress::Content { last })
            }
            Outcome::Canceled => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Canceled)
            }
            Outcome::Failed(e) => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Io(e))
            }
            _ => {
                self.recv_buf = Some(buf);
                self.phase = Phase::Closed;
                Err(Error::Busy)
            }
        }
    }

    /// The parsed response head, while its bytes are still buffered
    ///
    /// `None` before headers complete and after the buffer was reused
    /// for body content.
    pub fn head(&self) -> Option<Head> {
        if self.head_len == 0 {
            return None;
        }
        let buf = self.recv_buf.as_ref()?;
        Head::parse(&buf[..self.head_len], self.scanner.line()).ok()
    }

    /// The most recent body fragment
    ///
    /// After `Progress::Headers` this is the body prefix that arrived
    /// together with the head (possibly empty); after
    /// `Progress::Content` it is the bytes of that completion.
    pub fn fragment(&self) -> &[u8] {
        match self.recv_buf.as_ref() {
            Some(buf) => &buf[self.frag.0..self.frag.0 + self.frag.1],
            None => &[],
        }
    }

    /// `Content-Length` of the current response, if it carried one
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// True once the whole response body was delivered
    ///
    /// A response without `Content-Length` is complete right after its
    /// headers.
    pub fn fully_read_response_content(&self) -> bool {
        self.head_done && match self.content_length {
            Some(cl) => self.content_read >= cl,
            None => true,
        }
    }
}
