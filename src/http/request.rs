/// HTTP request methods.
///
/// Only GET and HEAD are served. Anything else is still parsed so the
/// connection can answer with 405 Method Not Allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// Any other token found in the method position
    Other(String),
}

impl From<&str> for Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use staticd::http::request::Method;
    /// assert_eq!(Method::from("GET"), Method::GET);
    /// assert_eq!(Method::from("get"), Method::Other("get".to_string()));
    /// ```
    fn from(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            other => Method::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => f.write_str("GET"),
            Method::HEAD => f.write_str("HEAD"),
            Method::Other(s) => f.write_str(s),
        }
    }
}

/// A parsed HTTP request line.
///
/// Header lines are read off the socket but never interpreted, and request
/// bodies are not supported, so only the request line survives parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, HEAD, ...)
    pub method: Method,
    /// The raw request target, still percent-encoded (e.g. "/docs/a%20b.txt?x=1")
    pub path: String,
    /// HTTP version token as sent by the client (e.g. "HTTP/1.0")
    pub version: String,
}

impl Request {
    /// Whether the request only wants headers.
    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// The request target without its query string and fragment.
    pub fn path_without_query(&self) -> &str {
        strip_query(&self.path)
    }
}

/// Cuts a request target at the first `?` or `#`.
pub fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(idx) => &path[..idx],
        None => path,
    }
}
