use super::{Error, Head, ResponseWriter};


/// Per-connection protocol handler supplied by the user
///
/// The server creates one handler per accepted connection (through the
/// factory passed to `Server::new`) and calls it from the reactor thread
/// only, in request order: `request_headers`, then `body_fragment` until
/// the last fragment, then `respond`. On a keep-alive connection the
/// cycle repeats for the next request.
///
/// Any `Err` returned from a callback turns into a 500 response and the
/// connection is closed after it is sent.
pub trait Handler {
    /// Called once per accepted connection before the first recv
    fn start(&mut self) {}

    /// Headers of a request are parsed
    ///
    /// The borrows inside `Head` die with this call; copy out whatever
    /// you need for building the response.
    fn request_headers(&mut self, head: &Head) -> Result<(), Error>;

    /// A piece of the request body arrived
    ///
    /// Called at least once per request: a request without a body (or
    /// with `Content-Length: 0`) produces a single empty fragment with
    /// `last == true`, so end-of-body is always observable.
    fn body_fragment(&mut self, data: &[u8], last: bool)
        -> Result<(), Error>;

    /// Produce the response
    ///
    /// The header section must be completed here. Call
    /// `ResponseWriter::finish` to send everything in one fragment, or
    /// leave it out to stream further fragments through `send_more`.
    fn respond(&mut self, w: &mut ResponseWriter) -> Result<(), Error>;

    /// A non-final fragment is on the wire; write the next one
    ///
    /// The default finishes the response, so handlers that always call
    /// `finish` inside `respond` never see this. Multi-fragment handlers
    /// override it and call `finish` from here when done.
    fn send_more(&mut self, w: &mut ResponseWriter) -> Result<(), Error> {
        w.finish();
        Ok(())
    }

    /// The connection is about to close because of `err`
    ///
    /// Covers receive timeouts (`Error::Canceled`), peer resets and I/O
    /// failures. Purely an observation hook; the close is unconditional.
    fn error(&mut self, _err: &Error) {}
}
