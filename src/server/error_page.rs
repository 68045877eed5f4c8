use crate::base_serializer::{Body, MessageState};
use crate::buffer::IoBuf;
use crate::enums::{StatusCode, Version};

#[cfg(feature = "date_header")]
use std::time::SystemTime;

const PART1: &str = "\
    <!DOCTYPE html>\
    <html>\
        <head>\
            <title>\
    ";
const PART2: &str = "\
            </title>\
        </head>\
        <body>\
            <h1>\
    ";
const PART3: &str = concat!("\
            </h1>\
            <hr>\
            <p>Yours faithfully,<br>\
                cq-http/", env!("CARGO_PKG_VERSION"), "\
            </p>\
        </body>\
    </html>\
    ");

/// Render the default error page into the send buffer
///
/// Always carries `Connection: close`; the connection is torn down after
/// this response. Fits the minimum send buffer (1024 bytes) for every
/// status code.
pub(crate) fn render(status: StatusCode, version: Version, buf: &mut IoBuf) {
    let code = status.as_u16();
    let reason = status.reason();
    let content_length = PART1.len() + PART2.len() + PART3.len() +
        2 * (4 + reason.len());
    let mut msg = MessageState::ResponseStart {
        version,
        body: Body::Normal,
        close: true,
    };
    msg.response_status(buf, code, reason);
    #[cfg(feature = "date_header")]
    msg.format_header(buf, "Date",
        httpdate::fmt_http_date(SystemTime::now())).unwrap();
    msg.add_length(buf, content_length as u64).unwrap();
    msg.add_header(buf, "Content-Type", b"text/html").unwrap();
    if msg.done_headers(buf).unwrap() {
        let title = format!("{:03} {}", code, reason);
        msg.write_body(buf, PART1.as_bytes());
        msg.write_body(buf, title.as_bytes());
        msg.write_body(buf, PART2.as_bytes());
        msg.write_body(buf, title.as_bytes());
        msg.write_body(buf, PART3.as_bytes());
    }
    msg.done();
}
