//! A scripted reactor double: records submissions, lets the test play
//! the completions back.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::os::unix::io::RawFd;

use cq_http::reactor::{Completion, IoQueue, Outcome, Token};
use cq_http::IoBuf;

#[derive(Debug)]
pub enum Submitted {
    Accept { token: Token, fd: RawFd },
    Connect { token: Token, fd: RawFd, addr: SocketAddr, timeout_ns: u64 },
    Recv { token: Token, fd: RawFd, buf: IoBuf, timeout_ns: u64 },
    Send { token: Token, fd: RawFd, buf: IoBuf, start: usize,
           timeout_ns: u64 },
}

#[derive(Debug)]
pub struct MockQueue {
    pub submissions: VecDeque<Submitted>,
    pub closed: Vec<RawFd>,
}

impl MockQueue {
    pub fn new() -> MockQueue {
        MockQueue {
            submissions: VecDeque::new(),
            closed: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.submissions.is_empty()
    }

    fn take_first<M>(&mut self, matcher: M) -> Submitted
        where M: Fn(&Submitted) -> bool
    {
        let pos = self.submissions.iter().position(matcher)
            .unwrap_or_else(|| panic!("no matching submission in {:?}",
                                      self.submissions));
        self.submissions.remove(pos).expect("position is valid")
    }

    /// Take the oldest recv submission and inspect its buffer
    pub fn take_recv(&mut self) -> (Token, RawFd, IoBuf, u64) {
        match self.take_first(|s| matches!(s, Submitted::Recv { .. })) {
            Submitted::Recv { token, fd, buf, timeout_ns } => {
                (token, fd, buf, timeout_ns)
            }
            _ => unreachable!(),
        }
    }

    /// Complete the oldest recv submission with `data`
    pub fn complete_recv(&mut self, data: &[u8]) -> Completion {
        let (token, _, mut buf, _) = self.take_recv();
        buf.writable()[..data.len()].copy_from_slice(data);
        Completion {
            token,
            outcome: Outcome::Transferred(data.len()),
            buf: Some(buf),
        }
    }

    /// Complete the oldest recv submission with an outcome that carries
    /// no data (timeout, error)
    pub fn complete_recv_with(&mut self, outcome: Outcome) -> Completion {
        let (token, _, buf, _) = self.take_recv();
        Completion { token, outcome, buf: Some(buf) }
    }

    /// Complete the oldest send submission fully, returning the wire
    /// bytes
    pub fn complete_send(&mut self) -> (Completion, Vec<u8>) {
        match self.take_first(|s| matches!(s, Submitted::Send { .. })) {
            Submitted::Send { token, buf, start, .. } => {
                let wire = buf[start..].to_vec();
                let n = buf.len() - start;
                let completion = Completion {
                    token,
                    outcome: Outcome::Transferred(n),
                    buf: Some(buf),
                };
                (completion, wire)
            }
            _ => unreachable!(),
        }
    }

    /// Complete only `n` bytes of the oldest send submission
    pub fn complete_send_partial(&mut self, n: usize) -> (Completion, Vec<u8>)
    {
        match self.take_first(|s| matches!(s, Submitted::Send { .. })) {
            Submitted::Send { token, buf, start, .. } => {
                let wire = buf[start..start + n].to_vec();
                let completion = Completion {
                    token,
                    outcome: Outcome::Transferred(n),
                    buf: Some(buf),
                };
                (completion, wire)
            }
            _ => unreachable!(),
        }
    }

    /// Complete the outstanding accept submission with a new fd
    pub fn complete_accept(&mut self, new_fd: RawFd) -> Completion {
        match self.take_first(|s| matches!(s, Submitted::Accept { .. })) {
            Submitted::Accept { token, .. } => Completion {
                token,
                outcome: Outcome::Accepted(new_fd),
                buf: None,
            },
            _ => unreachable!(),
        }
    }

    /// Complete the outstanding connect submission
    pub fn complete_connect(&mut self) -> Completion {
        self.complete_connect_with(Outcome::Connected)
    }

    /// Complete the outstanding connect submission with a failure
    pub fn complete_connect_with(&mut self, outcome: Outcome) -> Completion {
        match self.take_first(|s| matches!(s, Submitted::Connect { .. })) {
            Submitted::Connect { token, .. } => {
                Completion { token, outcome, buf: None }
            }
            _ => unreachable!(),
        }
    }

    pub fn has_pending_recv(&self) -> bool {
        self.submissions.iter()
            .any(|s| matches!(s, Submitted::Recv { .. }))
    }

    pub fn has_pending_send(&self) -> bool {
        self.submissions.iter()
            .any(|s| matches!(s, Submitted::Send { .. }))
    }

    pub fn has_pending_accept(&self) -> bool {
        self.submissions.iter()
            .any(|s| matches!(s, Submitted::Accept { .. }))
    }
}

impl IoQueue for MockQueue {
    fn accept(&mut self, token: Token, fd: RawFd) {
        self.submissions.push_back(Submitted::Accept { token, fd });
    }

    fn connect_with_timeout(&mut self, token: Token, fd: RawFd,
        addr: SocketAddr, timeout_ns: u64)
    {
        self.submissions.push_back(
            Submitted::Connect { token, fd, addr, timeout_ns });
    }

    fn recv_with_timeout(&mut self, token: Token, fd: RawFd, buf: IoBuf,
        timeout_ns: u64)
    {
        assert!(buf.capacity() > buf.len(), "recv into a full buffer");
        self.submissions.push_back(
            Submitted::Recv { token, fd, buf, timeout_ns });
    }

    fn send_with_timeout(&mut self, token: Token, fd: RawFd, buf: IoBuf,
        start: usize, timeout_ns: u64)
    {
        assert!(start < buf.len(), "empty send submitted");
        self.submissions.push_back(
            Submitted::Send { token, fd, buf, start, timeout_ns });
    }

    fn close(&mut self, fd: RawFd) {
        self.closed.push(fd);
    }
}
