//! HTTP client protocol implementation
//!
//! A [`Client`](struct.Client.html) drives one connection: connect, send
//! a request, read the response head, then pull body fragments one at a
//! time. Like the server it owns no I/O; submissions go to the
//! embedder's [`IoQueue`](../reactor/trait.IoQueue.html) and completions
//! come back through [`handle`](struct.Client.html#method.handle).
//!
//! Note, most of the time you need some reconnection facility and/or
//! connection pooling on top of this interface.
mod config;
mod encoder;
mod errors;
mod head;
mod proto;

pub use self::encoder::RequestWriter;
pub use self::errors::Error;
pub use self::head::Head;
pub use self::proto::{Client, Progress};
pub use crate::base_serializer::HeaderError;

use std::time::Duration;

/// Fine-grained configuration of the HTTP client
#[derive(Debug, Clone)]
pub struct Config {
    connect_timeout: Duration,
    send_timeout: Duration,
    recv_timeout: Duration,
    response_header_buf_ini_len: usize,
    response_header_buf_max_len: usize,
    send_buf_len: usize,
}
