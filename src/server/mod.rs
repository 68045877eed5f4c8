//! HTTP server protocol implementation
//!
//! The [`Server`](struct.Server.html) owns the listening socket and a
//! slot table of accepted connections. It is driven entirely by the
//! embedder's dispatch loop: call [`start`](struct.Server.html#method.start)
//! once, then feed it every [`Completion`](../reactor/struct.Completion.html)
//! whose token it issued.
mod config;
mod error;
mod error_page;
mod handler;
mod headers;
mod proto;
mod response_writer;

pub use self::error::Error;
pub use self::handler::Handler;
pub use self::headers::{is_keep_alive, Head};
pub use self::response_writer::ResponseWriter;
pub use crate::base_serializer::HeaderError;

use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, trace};

use self::proto::{Connection, Phase};
use crate::reactor::{Completion, IoQueue, Outcome, Token};

/// Token of the accept submission; connection tokens are slot numbers
const ACCEPT: Token = Token(u64::MAX);

/// Fine-grained configuration of the HTTP server
#[derive(Debug, Clone)]
pub struct Config {
    client_header_buffer_size: usize,
    large_client_header_buffer_size: usize,
    large_client_header_buffer_max_count: usize,
    client_body_buffer_size: usize,
    response_buffer_size: usize,
    recv_timeout: Duration,
    send_timeout: Duration,
}

/// HTTP/1.x server over a completion-based reactor
///
/// Generic over the user's [`Handler`](trait.Handler.html); the factory
/// closure creates one handler per accepted connection. Connections live
/// in a slot table whose indices are stable for the connection lifetime
/// and double as completion tokens, so a completion always finds its
/// connection even after earlier slots were freed and reused.
pub struct Server<H, F> {
    cfg: Arc<Config>,
    listener: RawFd,
    factory: F,
    connections: Vec<Option<Connection<H>>>,
    shutdown: bool,
}

impl<H: Handler, F: FnMut() -> H> Server<H, F> {
    /// Create a server around an already-listening socket
    pub fn new(listener: RawFd, cfg: &Arc<Config>, factory: F)
        -> Server<H, F>
    {
        Server {
            cfg: cfg.clone(),
            listener,
            factory,
            connections: Vec::new(),
            shutdown: false,
        }
    }

    /// Submit the first accept
    pub fn start<Q: IoQueue>(&mut self, q: &mut Q) {
        q.accept(ACCEPT, self.listener);
    }

    /// Dispatch one completion delivered by the reactor
    pub fn handle<Q: IoQueue>(&mut self, q: &mut Q, completion: Completion) {
        let Completion { token, outcome, buf } = completion;
        if token == ACCEPT {
            self.accepted(q, outcome);
            return;
        }
        let slot = token.0 as usize;
        let closing = match self.connections.get_mut(slot) {
            Some(Some(conn)) => {
                conn.handle(q, &self.cfg, self.shutdown, outcome, buf);
                conn.phase() == Phase::Closing
            }
            _ => {
                // completion raced with an unconditional close
                trace!("stale completion for slot {}", slot);
                false
            }
        };
        if closing {
            self.remove(q, slot);
        }
    }

    fn accepted<Q: IoQueue>(&mut self, q: &mut Q, outcome: Outcome) {
        match outcome {
            Outcome::Accepted(fd) => {
                if self.shutdown {
                    debug!("shutting down, refusing fd {}", fd);
                    q.close(fd);
                    return;
                }
                let slot = match self.connections.iter()
                    .position(|c| c.is_none())
                {
                    Some(slot) => slot,
                    None => {
                        self.connections.push(None);
                        self.connections.len() - 1
                    }
                };
                debug!("accepted connection in slot {} (fd {})", slot, fd);
                let mut conn =
                    Connection::new(fd, slot, (self.factory)(), &self.cfg);
                conn.start(q, &self.cfg);
                self.connections[slot] = Some(conn);
                q.accept(ACCEPT, self.listener);
            }
            Outcome::Failed(e) => {
                error!("accept error: {}", e);
                if !self.shutdown {
                    q.accept(ACCEPT, self.listener);
                }
            }
            Outcome::Canceled => {
                debug!("accept canceled");
            }
            Outcome::Connected | Outcome::Transferred(..) => {
                trace!("unexpected completion on accept token");
            }
        }
    }

    fn remove<Q: IoQueue>(&mut self, q: &mut Q, slot: usize) {
        if let Some(conn) = self.connections[slot].take() {
            debug!("freeing slot {} (fd {})", slot, conn.fd());
            q.close(conn.fd());
        }
    }

    /// Stop taking new requests and wind the server down
    ///
    /// Connections sitting between requests are closed right away; the
    /// ones processing a request finish it (keep-alive is suppressed so
    /// they close right after). New requests are neither accepted nor
    /// read. `is_done` flips once every slot is empty.
    pub fn request_shutdown<Q: IoQueue>(&mut self, q: &mut Q) {
        debug!("shutdown requested, {} connections open",
               self.connection_count());
        self.shutdown = true;
        for slot in 0..self.connections.len() {
            let idle = self.connections[slot].as_ref()
                .map(|c| !c.is_processing())
                .unwrap_or(false);
            if idle {
                self.remove(q, slot);
            }
        }
    }

    /// True once shutdown was requested and every connection is gone
    pub fn is_done(&self) -> bool {
        self.shutdown && self.connections.iter().all(|c| c.is_none())
    }

    /// Number of currently open connections
    pub fn connection_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_some()).count()
    }
}
