use std::sync::Arc;
use std::time::Duration;

use super::Config;

impl Config {
    /// Create a config with defaults
    pub fn new() -> Config {
        Config {
            connect_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(30),
            recv_timeout: Duration::from_secs(30),
            response_header_buf_ini_len: 1024,
            response_header_buf_max_len: 65536,
            send_buf_len: 8192,
        }
    }

    /// Timeout for establishing a connection
    pub fn connect_timeout(&mut self, value: Duration) -> &mut Self {
        self.connect_timeout = value;
        self
    }

    /// Timeout for every send submission
    pub fn send_timeout(&mut self, value: Duration) -> &mut Self {
        self.send_timeout = value;
        self
    }

    /// Timeout for every recv submission
    pub fn recv_timeout(&mut self, value: Duration) -> &mut Self {
        self.recv_timeout = value;
        self
    }

    /// Initial size of the response header buffer
    ///
    /// # Panics
    ///
    /// Panics on zero.
    pub fn response_header_buf_ini_len(&mut self, value: usize) -> &mut Self {
        assert!(value > 0);
        self.response_header_buf_ini_len = value;
        self
    }

    /// Largest size the response header buffer may grow to
    ///
    /// A response head over this limit fails with `HeaderFieldsTooLong`.
    ///
    /// # Panics
    ///
    /// Panics when smaller than `response_header_buf_ini_len`.
    pub fn response_header_buf_max_len(&mut self, value: usize) -> &mut Self {
        assert!(value >= self.response_header_buf_ini_len);
        self.response_header_buf_max_len = value;
        self
    }

    /// Initial size of the send buffer
    ///
    /// # Panics
    ///
    /// Panics on zero.
    pub fn send_buf_len(&mut self, value: usize) -> &mut Self {
        assert!(value > 0);
        self.send_buf_len = value;
        self
    }

    /// Create an Arc'd config clone to pass to the constructor
    ///
    /// This is just a convenience method.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}
