use std::io;

use quick_error::quick_error;

use crate::error::ParseError;


quick_error! {
    #[derive(Debug)]
    pub enum Error {
        /// I/O (basically networking) error reported by the reactor
        Io(err: io::Error) {
            description("I/O error")
            display("I/O error: {}", err)
            from()
        }
        /// Request could not be parsed
        Parse(err: ParseError) {
            description("parse error")
            display("parse error: {}", err)
            from()
        }
        /// The linked timeout fired before the operation finished
        Canceled {
            description("operation timed out")
            display("operation timed out")
        }
        /// Connection reset by peer in the middle of a message
        UnexpectedEof {
            description("connection closed prematurely")
            display("connection closed prematurely")
        }
        /// A user handler reported failure; the client gets a 500
        Handler(msg: String) {
            description("handler error")
            display("handler error: {}", msg)
        }
    }
}
