/// Enum representing HTTP request methods.
///
/// ```rust,ignore
/// match req.method {
///     Method::Get => {},   // handle GET
///     Method::Post => {},  // handle POST requests
///     Method::Other(m) => { println!("Custom method {}", m); },
///     _ => {}
/// }
/// ```
///
/// The `Other` variant borrows the token bytes out of the request buffer;
/// the scanner has already checked they are `tchar`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method<'a> {
    Options,
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Trace,
    Connect,
    Other(&'a str),
}

impl<'a> Method<'a> {
    /// Match the canonical set, falling back to `Other`
    pub fn from_str(s: &'a str) -> Method<'a> {
        match s {
            "OPTIONS"   => Method::Options,
            "GET"       => Method::Get,
            "HEAD"      => Method::Head,
            "POST"      => Method::Post,
            "PUT"       => Method::Put,
            "PATCH"     => Method::Patch,
            "DELETE"    => Method::Delete,
            "TRACE"     => Method::Trace,
            "CONNECT"   => Method::Connect,
            s => Method::Other(s),
        }
    }

    /// The wire form of the method
    pub fn as_str(&self) -> &'a str {
        match *self {
            Method::Options => "OPTIONS",
            Method::Get     => "GET",
            Method::Head    => "HEAD",
            Method::Post    => "POST",
            Method::Put     => "PUT",
            Method::Patch   => "PATCH",
            Method::Delete  => "DELETE",
            Method::Trace   => "TRACE",
            Method::Connect => "CONNECT",
            Method::Other(s) => s,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Method;

    #[test]
    fn canonical_round_trip() {
        for name in &["OPTIONS", "GET", "HEAD", "POST", "PUT", "PATCH",
                      "DELETE", "TRACE", "CONNECT"]
        {
            let m = Method::from_str(name);
            assert!(!matches!(m, Method::Other(..)), "{}", name);
            assert_eq!(m.as_str(), *name);
        }
    }

    #[test]
    fn custom_method() {
        let m = Method::from_str("PURGE");
        assert_eq!(m, Method::Other("PURGE"));
        assert_eq!(m.as_str(), "PURGE");
    }

    #[test]
    fn case_matters() {
        // methods are case-sensitive tokens
        assert_eq!(Method::from_str("get"), Method::Other("get"));
    }
}
