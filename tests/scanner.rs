//! Scanner invariants: fragmentation-invariance, boundedness, idempotent
//! completion, and the literal scenarios the scanners must fix.

use cq_http::scan::{HeaderBlockScanner, RequestLineScanner, RequestScanner,
                    ResponseScanner, StatusLineScanner};
use cq_http::server::Head;
use cq_http::{Method, ParseError, Version};

const SIMPLE_GET: &[u8] = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

#[test]
fn simple_get() {
    let mut scanner = RequestScanner::new();
    assert!(scanner.scan(SIMPLE_GET).unwrap());
    assert_eq!(scanner.head_len(), SIMPLE_GET.len());

    let head = Head::parse(SIMPLE_GET, scanner.line()).unwrap();
    assert_eq!(head.method(), Method::Get);
    assert_eq!(head.uri(), "/");
    assert_eq!(head.version(), Version::Http11);
    assert!(head.is_keep_alive());
    assert_eq!(head.content_length(), None);

    let fields: Vec<_> = head.fields().iter()
        .map(|f| f.unwrap())
        .collect();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "Host");
    assert_eq!(fields[0].value, b"example.com");
}

#[test]
fn byte_at_a_time_matches_whole_input() {
    let mut whole = RequestScanner::new();
    assert!(whole.scan(SIMPLE_GET).unwrap());

    let mut split = RequestScanner::new();
    let mut done = false;
    for b in SIMPLE_GET.iter() {
        assert!(!done);
        done = split.scan(std::slice::from_ref(b)).unwrap();
    }
    assert!(done);
    assert_eq!(split.head_len(), whole.head_len());
    assert_eq!(split.block_start(), whole.block_start());
    assert_eq!(split.line().method_len(), whole.line().method_len());
    assert_eq!(split.line().uri(), whole.line().uri());
    assert_eq!(split.line().version(), whole.line().version());
}

#[test]
fn every_two_chunk_split_is_equivalent() {
    let input = b"POST /submit HTTP/1.0\r\nHost: a\r\nContent-Length: 3\r\n\r\n";
    let mut reference = RequestScanner::new();
    assert!(reference.scan(input).unwrap());

    for cut in 0..=input.len() {
        let mut s = RequestScanner::new();
        let done = s.scan(&input[..cut]).unwrap();
        assert_eq!(done, cut == input.len(), "cut {}", cut);
        if !done {
            assert!(s.scan(&input[cut..]).unwrap(), "cut {}", cut);
        }
        assert_eq!(s.head_len(), reference.head_len(), "cut {}", cut);
        assert_eq!(s.line().uri(), reference.line().uri(), "cut {}", cut);
    }
}

#[test]
fn empty_chunks_are_harmless() {
    let mut s = RequestScanner::new();
    assert!(!s.scan(b"").unwrap());
    assert!(!s.scan(b"GET / ").unwrap());
    assert!(!s.scan(b"").unwrap());
    assert!(s.scan(b"HTTP/1.1\r\n\r\n").unwrap());
}

#[test]
fn method_over_limit_fails_at_first_excess_byte() {
    let mut line = RequestLineScanner::with_limits(7, 8192);
    assert_eq!(line.scan(b"PURGE_ALL / HTTP/1.1\r\n\r\n").unwrap_err(),
               ParseError::BadRequest);
    assert_eq!(line.bytes_read(), 8);
}

#[test]
fn http09_request_is_version_not_supported() {
    let mut s = RequestScanner::new();
    assert_eq!(s.scan(b"GET /\r\n").unwrap_err(),
               ParseError::VersionNotSupported);
}

#[test]
fn uri_bound_is_exact() {
    // limit 10, uri of exactly 10 passes
    let mut s = RequestLineScanner::with_limits(32, 10);
    assert!(s.scan(b"GET /123456789 HTTP/1.1\r\n").unwrap());

    let mut s = RequestLineScanner::with_limits(32, 10);
    assert_eq!(s.scan(b"GET /1234567890 HTTP/1.1\r\n").unwrap_err(),
               ParseError::UriTooLong);
}

#[test]
fn header_cap_yields_specific_error() {
    let mut s = HeaderBlockScanner::with_limit(Some(10));
    assert_eq!(
        s.scan(b"X-Header-Name: some long value\r\n\r\n").unwrap_err(),
        ParseError::HeaderFieldsTooLong);
    assert_eq!(s.bytes_read(), 11);
}

#[test]
fn completed_scanners_reject_more_input() {
    let mut req = RequestScanner::new();
    assert!(req.scan(SIMPLE_GET).unwrap());
    assert_eq!(req.scan(b"x").unwrap_err(), ParseError::BadRequest);
    assert_eq!(req.scan(b"").unwrap_err(), ParseError::BadRequest);

    let mut line = StatusLineScanner::new();
    assert!(line.scan(b"HTTP/1.1 200 OK\r\n").unwrap());
    assert_eq!(line.scan(b"x").unwrap_err(), ParseError::BadRequest);

    let mut block = HeaderBlockScanner::new();
    assert!(block.scan(b"\r\n").unwrap());
    assert_eq!(block.scan(b"x").unwrap_err(), ParseError::BadRequest);
}

#[test]
fn response_head_with_body_prefix() {
    let input = b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123";
    let mut s = ResponseScanner::new();
    assert!(s.scan(input).unwrap());
    assert_eq!(s.head_len(), input.len() - 4);
    assert_eq!(s.line().code_start(), 9);
}

#[test]
fn status_line_fragmentation() {
    let input = b"HTTP/1.0 503 Service Unavailable\r\n\r\n";
    let mut reference = ResponseScanner::new();
    assert!(reference.scan(input).unwrap());

    for cut in 0..=input.len() {
        let mut s = ResponseScanner::new();
        let done = s.scan(&input[..cut]).unwrap();
        if !done {
            assert!(s.scan(&input[cut..]).unwrap(), "cut {}", cut);
        }
        assert_eq!(s.line().reason(), reference.line().reason(),
                   "cut {}", cut);
        assert_eq!(s.head_len(), reference.head_len(), "cut {}", cut);
    }
}

#[test]
fn bare_lf_is_rejected() {
    let mut s = RequestScanner::new();
    assert_eq!(s.scan(b"GET / HTTP/1.1\n").unwrap_err(),
               ParseError::BadRequest);
}

#[test]
fn leading_space_in_request_line() {
    let mut s = RequestScanner::new();
    assert_eq!(s.scan(b" GET / HTTP/1.1\r\n").unwrap_err(),
               ParseError::BadRequest);
}
