use std::cmp::min;
use std::os::unix::io::RawFd;

use log::{debug, error, trace};

use crate::base_serializer::{Body, MessageState};
use crate::buffer::IoBuf;
use crate::enums::{Method, StatusCode, Version};
use crate::error::ParseError;
use crate::reactor::{ns, IoQueue, Outcome, Token};
use crate::scan::RequestScanner;

use super::error_page;
use super::headers::Head;
use super::response_writer::ResponseWriter;
use super::{Config, Error, Handler};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Waiting for (more of) a request head
    ReceivingHeaders,
    /// Head is parsed, body bytes are still arriving
    ReceivingContent,
    /// A response fragment is on the wire
    Sending,
    /// Between a finished response and the next submission
    Idle,
    /// Terminal; the server frees the slot on seeing this
    Closing,
}

/// What to do after the head of a request was processed
enum Step {
    Fail(StatusCode),
    ReadBody,
    Respond,
}

/// One accepted connection and its protocol state
///
/// All buffers are `Option` because they are moved into submissions and
/// handed back by completions; `None` means "currently lent to the
/// reactor" for the recv/send buffer that matches the current phase.
pub(crate) struct Connection<H> {
    fd: RawFd,
    slot: usize,
    handler: H,
    phase: Phase,
    scanner: RequestScanner,
    hbuf: Option<IoBuf>,
    body_buf: Option<IoBuf>,
    send_buf: Option<IoBuf>,
    msg: MessageState,
    version: Version,
    is_head: bool,
    keep_alive: bool,
    processing: bool,
    content_length: u64,
    content_read: u64,
    head_len: usize,
    /// Bytes of `hbuf` already fed to the scanner
    fed: usize,
    last_fragment: bool,
    /// Processed-length counter of the running `send_full`
    send_processed: usize,
    close_after_send: bool,
}

impl<H: Handler> Connection<H> {
    pub fn new(fd: RawFd, slot: usize, handler: H, cfg: &Config)
        -> Connection<H>
    {
        Connection {
            fd,
            slot,
            handler,
            phase: Phase::Idle,
            scanner: RequestScanner::new(),
            hbuf: Some(IoBuf::with_capacity(cfg.client_header_buffer_size)),
            body_buf: None,
            send_buf: Some(IoBuf::with_capacity(cfg.response_buffer_size)),
            msg: MessageState::Done,
            version: Version::Http11,
            is_head: false,
            keep_alive: true,
            processing: false,
            content_length: 0,
            content_read: 0,
            head_len: 0,
            fed: 0,
            last_fragment: false,
            send_processed: 0,
            close_after_send: false,
        }
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True between parsing a request head and finishing its response
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Run the `start` hook and submit the first recv
    pub fn start<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config) {
        self.handler.start();
        self.phase = Phase::ReceivingHeaders;
        self.submit_recv_headers(q, cfg);
    }

    /// Advance the state machine with a completion for this connection
    pub fn handle<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool, outcome: Outcome, buf: Option<IoBuf>)
    {
        match self.phase {
            Phase::ReceivingHeaders => {
                self.headers_event(q, cfg, shutdown, outcome, buf)
            }
            Phase::ReceivingContent => {
                self.content_event(q, cfg, shutdown, outcome, buf)
            }
            Phase::Sending => {
                self.send_event(q, cfg, shutdown, outcome, buf)
            }
            Phase::Idle | Phase::Closing => {
                trace!("connection {}: completion in phase {:?} dropped",
                       self.slot, self.phase);
            }
        }
    }

    fn close(&mut self) {
        self.phase = Phase::Closing;
    }

    fn submit_recv_headers<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config) {
        let buf = self.hbuf.take().expect("header buffer is present");
        trace!("connection {}: recv up to {} header bytes",
               self.slot, buf.capacity() - buf.len());
        q.recv_with_timeout(Token(self.slot as u64), self.fd, buf,
            ns(cfg.recv_timeout));
    }

    fn submit_recv_body<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config) {
        let buf = self.body_buf.take().unwrap_or_else(
            || IoBuf::with_capacity(cfg.client_body_buffer_size));
        q.recv_with_timeout(Token(self.slot as u64), self.fd, buf,
            ns(cfg.recv_timeout));
    }

    fn submit_send<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config) {
        let buf = self.send_buf.take().expect("send buffer is present");
        q.send_with_timeout(Token(self.slot as u64), self.fd, buf,
            self.send_processed, ns(cfg.send_timeout));
    }

    fn headers_event<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool, outcome: Outcome, buf: Option<IoBuf>)
    {
        let mut buf = buf.expect("recv completion returns the buffer");
        match outcome {
            Outcome::Transferred(0) => {
                self.hbuf = Some(buf);
                if self.fed > 0 {
                    // peer went away in the middle of a request head
                    error!("connection {}: eof after {} header bytes",
                           self.slot, self.fed);
                    self.handler.error(&Error::UnexpectedEof);
                } else {
                    debug!("connection {}: closed by peer", self.slot);
                }
                self.close();
            }
            Outcome::Transferred(n) => {
                buf.advance(n);
                self.hbuf = Some(buf);
                self.feed(q, cfg, shutdown);
            }
            Outcome::Canceled => {
                self.hbuf = Some(buf);
                debug!("connection {}: recv timed out", self.slot);
                self.handler.error(&Error::Canceled);
                self.close();
            }
            Outcome::Failed(e) => {
                self.hbuf = Some(buf);
                debug!("connection {}: recv error: {}", self.slot, e);
                self.handler.error(&Error::Io(e));
                self.close();
            }
            Outcome::Accepted(..) | Outcome::Connected => {
                trace!("connection {}: unexpected completion", self.slot);
                self.hbuf = Some(buf);
                self.close();
            }
        }
    }

    /// Feed unscanned header-buffer bytes to the scanner and act on the
    /// result
    fn feed<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config, shutdown: bool) {
        let res = {
            let buf = self.hbuf.as_ref().expect("header buffer is present");
            let res = self.scanner.scan(&buf[self.fed..]);
            self.fed = buf.len();
            res
        };
        match res {
            Err(e) => {
                debug!("connection {}: bad request: {}", self.slot, e);
                self.respond_error(q, cfg, e.status());
            }
            Ok(false) => {
                let full = {
                    let buf = self.hbuf.as_mut()
                        .expect("header buffer is present");
                    if buf.is_full() {
                        let large = cfg.large_client_header_buffer_size;
                        let cap_max =
                            large * cfg.large_client_header_buffer_max_count;
                        let cap = buf.capacity();
                        if cap >= cap_max {
                            true
                        } else {
                            let new_cap = if cap < large {
                                large
                            } else {
                                min(cap + large, cap_max)
                            };
                            trace!("connection {}: header buffer {} -> {}",
                                   self.slot, cap, new_cap);
                            buf.grow(new_cap);
                            false
                        }
                    } else {
                        false
                    }
                };
                if full {
                    debug!("connection {}: request head over {} bytes",
                           self.slot,
                           cfg.large_client_header_buffer_size *
                           cfg.large_client_header_buffer_max_count);
                    self.respond_error(q, cfg,
                        ParseError::HeaderFieldsTooLong.status());
                } else {
                    self.submit_recv_headers(q, cfg);
                }
            }
            Ok(true) => self.request_ready(q, cfg, shutdown),
        }
    }

    /// The composed scanner completed: build the request view, dispatch
    /// the handler and pick the next phase
    fn request_ready<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool)
    {
        self.head_len = self.scanner.head_len();
        self.processing = true;
        let head_len = self.head_len;
        let step = {
            let buf = self.hbuf.as_ref().expect("header buffer is present");
            match Head::parse(&buf[..head_len], self.scanner.line()) {
                Err(e) => {
                    debug!("connection {}: bad request: {}", self.slot, e);
                    Step::Fail(e.status())
                }
                Ok(head) => {
                    self.version = head.version();
                    self.is_head = head.method() == Method::Head;
                    self.keep_alive = head.is_keep_alive();
                    self.content_length = head.content_length().unwrap_or(0);
                    let avail = (buf.len() - head_len) as u64;
                    let take = min(avail, self.content_length) as usize;
                    let done_body = take as u64 >= self.content_length;
                    let mut called = self.handler.request_headers(&head);
                    if called.is_ok() {
                        called = self.handler.body_fragment(
                            &buf[head_len..head_len + take], done_body);
                    }
                    match called {
                        Err(e) => {
                            error!("connection {}: handler error: {}",
                                   self.slot, e);
                            Step::Fail(StatusCode::INTERNAL_SERVER_ERROR)
                        }
                        Ok(()) => {
                            self.content_read = take as u64;
                            if done_body {
                                Step::Respond
                            } else {
                                Step::ReadBody
                            }
                        }
                    }
                }
            }
        };
        match step {
            Step::Fail(status) => self.respond_error(q, cfg, status),
            Step::Respond => self.begin_response(q, cfg, shutdown),
            Step::ReadBody => {
                self.phase = Phase::ReceivingContent;
                self.submit_recv_body(q, cfg);
            }
        }
    }

    fn content_event<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool, outcome: Outcome, buf: Option<IoBuf>)
    {
        let mut buf = buf.expect("recv completion returns the buffer");
        match outcome {
            Outcome::Transferred(0) => {
                self.body_buf = Some(buf);
                debug!("connection {}: eof inside request body ({}/{})",
                       self.slot, self.content_read, self.content_length);
                self.handler.error(&Error::UnexpectedEof);
                self.close();
            }
            Outcome::Transferred(n) => {
                buf.advance(n);
                self.body_buf = Some(buf);
                let remaining = self.content_length - self.content_read;
                let take = min(n as u64, remaining) as usize;
                self.content_read += take as u64;
                let last = self.content_read >= self.content_length;
                let res = {
                    let buf = self.body_buf.as_ref()
                        .expect("body buffer is present");
                    self.handler.body_fragment(&buf[..take], last)
                };
                match res {
                    Err(e) => {
                        error!("connection {}: handler error: {}",
                               self.slot, e);
                        self.respond_error(q, cfg,
                            StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    Ok(()) if last => {
                        self.body_buf = None;
                        self.begin_response(q, cfg, shutdown);
                    }
                    Ok(()) => {
                        if let Some(b) = self.body_buf.as_mut() {
                            b.clear();
                        }
                        self.submit_recv_body(q, cfg);
                    }
                }
            }
            Outcome::Canceled => {
                self.body_buf = Some(buf);
                debug!("connection {}: recv timed out inside body",
                       self.slot);
                self.handler.error(&Error::Canceled);
                self.close();
            }
            Outcome::Failed(e) => {
                self.body_buf = Some(buf);
                self.handler.error(&Error::Io(e));
                self.close();
            }
            Outcome::Accepted(..) | Outcome::Connected => {
                self.body_buf = Some(buf);
                self.close();
            }
        }
    }

    /// Let the handler build the first response fragment and submit it
    fn begin_response<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool)
    {
        self.phase = Phase::Sending;
        self.last_fragment = false;
        self.send_processed = 0;
        if shutdown {
            self.keep_alive = false;
        }
        {
            let buf = self.send_buf.as_mut().expect("send buffer is present");
            buf.clear();
        }
        self.msg = MessageState::ResponseStart {
            version: self.version,
            body: if self.is_head { Body::Head } else { Body::Normal },
            close: !self.keep_alive,
        };
        let res = {
            let buf = self.send_buf.as_mut().expect("send buffer is present");
            let mut w = ResponseWriter::new(&mut self.msg, buf,
                &mut self.last_fragment);
            self.handler.respond(&mut w)
        };
        match res {
            Err(e) => {
                error!("connection {}: handler error: {}", self.slot, e);
                if self.msg.is_started() {
                    // too late for an error page
                    self.close();
                } else {
                    self.respond_error(q, cfg,
                        StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
            Ok(()) => {
                if !self.msg.is_after_headers() {
                    error!("connection {}: handler left headers unfinished",
                           self.slot);
                    self.close();
                } else {
                    self.submit_send(q, cfg);
                }
            }
        }
    }

    /// Generate an error response and close once it is sent
    fn respond_error<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        status: StatusCode)
    {
        self.phase = Phase::Sending;
        self.processing = true;
        self.close_after_send = true;
        self.last_fragment = true;
        self.send_processed = 0;
        {
            let buf = self.send_buf.as_mut().expect("send buffer is present");
            buf.clear();
            error_page::render(status, self.version, buf);
        }
        self.submit_send(q, cfg);
    }

    fn send_event<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool, outcome: Outcome, buf: Option<IoBuf>)
    {
        let buf = buf.expect("send completion returns the buffer");
        self.send_buf = Some(buf);
        match outcome {
            Outcome::Transferred(n) => {
                self.send_processed += n;
                let total = self.send_buf.as_ref()
                    .expect("send buffer is present").len();
                if self.send_processed < total {
                    trace!("connection {}: short write, {}/{} sent",
                           self.slot, self.send_processed, total);
                    self.submit_send(q, cfg);
                } else if self.last_fragment {
                    self.response_complete(q, cfg, shutdown);
                } else {
                    self.next_fragment(q, cfg, shutdown);
                }
            }
            Outcome::Canceled => {
                debug!("connection {}: send timed out", self.slot);
                self.handler.error(&Error::Canceled);
                self.close();
            }
            Outcome::Failed(e) => {
                debug!("connection {}: send error: {}", self.slot, e);
                self.handler.error(&Error::Io(e));
                self.close();
            }
            Outcome::Accepted(..) | Outcome::Connected => {
                self.close();
            }
        }
    }

    /// A non-final fragment is on the wire; ask the handler for the next
    fn next_fragment<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool)
    {
        self.send_processed = 0;
        let res = {
            let buf = self.send_buf.as_mut().expect("send buffer is present");
            buf.clear();
            let mut w = ResponseWriter::new(&mut self.msg, buf,
                &mut self.last_fragment);
            self.handler.send_more(&mut w)
        };
        let written = self.send_buf.as_ref()
            .expect("send buffer is present").len();
        match res {
            Err(e) => {
                // mid-response, nothing useful can be sent anymore
                error!("connection {}: handler error: {}", self.slot, e);
                self.close();
            }
            Ok(()) if written == 0 && !self.last_fragment => {
                error!("connection {}: send_more produced no data",
                       self.slot);
                self.close();
            }
            Ok(()) if written == 0 => {
                self.response_complete(q, cfg, shutdown);
            }
            Ok(()) => self.submit_send(q, cfg),
        }
    }

    /// The last fragment is on the wire: close or rearm for the next
    /// request
    fn response_complete<Q: IoQueue>(&mut self, q: &mut Q, cfg: &Config,
        shutdown: bool)
    {
        self.phase = Phase::Idle;
        self.processing = false;
        if self.close_after_send || !self.keep_alive || shutdown {
            debug!("connection {}: closing after response", self.slot);
            self.close();
            return;
        }
        // rearm: drop the parsed request from the header buffer but keep
        // anything an eager client has sent beyond it
        let head_len = self.head_len;
        let body_from_hbuf = {
            let buf = self.hbuf.as_mut().expect("header buffer is present");
            let body_from_hbuf =
                min((buf.len() - head_len) as u64, self.content_length)
                    as usize;
            buf.consume(head_len + body_from_hbuf);
            body_from_hbuf
        };
        trace!("connection {}: keep-alive, {} bytes carried over",
               self.slot, self.fed - head_len - body_from_hbuf);
        self.scanner = RequestScanner::new();
        self.fed = 0;
        self.head_len = 0;
        self.content_length = 0;
        self.content_read = 0;
        self.is_head = false;
        self.last_fragment = false;
        self.send_processed = 0;
        self.phase = Phase::ReceivingHeaders;
        let leftover = !self.hbuf.as_ref()
            .expect("header buffer is present").is_empty();
        if leftover {
            self.feed(q, cfg, shutdown);
        } else {
            self.submit_recv_headers(q, cfg);
        }
    }
}
