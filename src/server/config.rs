use std::sync::Arc;
use std::time::Duration;

use super::Config;

impl Config {
    /// Create a config with defaults
    pub fn new() -> Config {
        Config {
            client_header_buffer_size: 1024,
            large_client_header_buffer_size: 8192,
            large_client_header_buffer_max_count: 4,
            client_body_buffer_size: 8192,
            response_buffer_size: 8192,
            recv_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(60),
        }
    }

    /// Initial size of the per-connection header buffer
    ///
    /// Most requests should fit; the buffer is grown on demand up to
    /// `large_client_header_buffer_size * large_client_header_buffer_max_count`.
    ///
    /// # Panics
    ///
    /// Panics on zero.
    pub fn client_header_buffer_size(&mut self, value: usize) -> &mut Self {
        assert!(value > 0);
        self.client_header_buffer_size = value;
        self
    }

    /// Size of one growth step of the header buffer
    ///
    /// # Panics
    ///
    /// Panics when smaller than `client_header_buffer_size`.
    pub fn large_client_header_buffer_size(&mut self, value: usize)
        -> &mut Self
    {
        assert!(value >= self.client_header_buffer_size);
        self.large_client_header_buffer_size = value;
        self
    }

    /// Number of large chunks the header buffer may grow to
    ///
    /// A request head over `large_client_header_buffer_size * value`
    /// bytes gets a 400 response.
    ///
    /// # Panics
    ///
    /// Panics on zero.
    pub fn large_client_header_buffer_max_count(&mut self, value: usize)
        -> &mut Self
    {
        assert!(value > 0);
        self.large_client_header_buffer_max_count = value;
        self
    }

    /// Size of the buffer request-body fragments are read into
    ///
    /// # Panics
    ///
    /// Panics on zero.
    pub fn client_body_buffer_size(&mut self, value: usize) -> &mut Self {
        assert!(value > 0);
        self.client_body_buffer_size = value;
        self
    }

    /// Initial size of the per-connection send buffer
    ///
    /// # Panics
    ///
    /// Panics below 1024 bytes: generated error responses must fit.
    pub fn response_buffer_size(&mut self, value: usize) -> &mut Self {
        assert!(value >= 1024);
        self.response_buffer_size = value;
        self
    }

    /// Timeout for every recv submission
    pub fn recv_timeout(&mut self, value: Duration) -> &mut Self {
        self.recv_timeout = value;
        self
    }

    /// Timeout for every send submission
    pub fn send_timeout(&mut self, value: Duration) -> &mut Self {
        self.send_timeout = value;
        self
    }

    /// Create an Arc'd config clone to pass to the constructor
    ///
    /// This is just a convenience method.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::Config;

    #[test]
    fn defaults() {
        let cfg = Config::new();
        assert_eq!(cfg.client_header_buffer_size, 1024);
        assert_eq!(cfg.large_client_header_buffer_size, 8192);
        assert_eq!(cfg.large_client_header_buffer_max_count, 4);
        assert!(cfg.response_buffer_size >= 1024);
    }

    #[test]
    #[should_panic]
    fn tiny_response_buffer_rejected() {
        Config::new().response_buffer_size(512);
    }

    #[test]
    #[should_panic]
    fn large_must_cover_small() {
        Config::new()
            .client_header_buffer_size(4096)
            .large_client_header_buffer_size(1024);
    }
}
