use tokio::fs::File;

use crate::http::date::HttpDate;

/// Value of the `Server` header.
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Content type of every generated HTML body.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File or listing served
/// - `BadRequest` (400): Request target does not start with `/`
/// - `Forbidden` (403): Path escapes the document root or cannot be decoded
/// - `NotFound` (404): Nothing at that path
/// - `MethodNotAllowed` (405): Anything but GET or HEAD
/// - `InternalServerError` (500): Directory could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use staticd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Response payload.
#[derive(Debug)]
pub enum Body {
    /// No payload at all
    Empty,
    /// Payload generated in memory (error pages, listings)
    Bytes(Vec<u8>),
    /// An open file streamed after the headers
    File(File),
}

impl Body {
    /// Length of an in-memory body. Files report `None`; their length is
    /// taken from metadata by whoever opens them.
    fn known_len(&self) -> Option<usize> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(bytes) => Some(bytes.len()),
            Body::File(_) => None,
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers keep insertion order so they go out on the wire exactly as built.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers in wire order
    pub headers: Vec<(String, String)>,
    /// Response body
    pub body: Body,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// `Date` and `Server` are filled in up front; `build` adds `Content-Length`
/// (if not set) and `Connection: close`.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain; charset=utf-8")
///     .body(b"hi".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Body,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: vec![
                ("Date".to_string(), HttpDate::now().to_string()),
                ("Server".to_string(), SERVER_NAME.to_string()),
            ],
            body: Body::Empty,
        }
    }

    /// Adds a header, or replaces the value in place if the name is already present.
    ///
    /// Names are compared case-insensitively.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(existing) => existing.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets an in-memory response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Sets a file body. The caller must supply `Content-Length`.
    pub fn file(mut self, file: File) -> Self {
        self.body = Body::File(file);
        self
    }

    /// Builds the final Response.
    pub fn build(mut self) -> Response {
        let has_length = self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"));
        if !has_length {
            if let Some(len) = self.body.known_len() {
                self.headers
                    .push(("Content-Length".to_string(), len.to_string()));
            }
        }
        self.headers
            .push(("Connection".to_string(), "close".to_string()));

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a response for an html document generated in memory.
    pub fn html(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(status)
            .header("Content-Type", HTML_CONTENT_TYPE)
            .body(body.into())
            .build()
    }

    /// Creates a response that streams `len` bytes of an open file.
    pub fn file(file: File, len: u64, content_type: &str) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .header("Content-Length", len.to_string())
            .file(file)
            .build()
    }

    /// Creates an error response with a small HTML page describing `status`.
    pub fn error(status: StatusCode, detail: &str) -> Self {
        Self::html(status, error_page(status, detail))
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::error(StatusCode::NotFound, "The requested resource was not found.")
    }

    /// Looks up a header value by name, case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Value of `Content-Length`, if it parses.
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
    }
}

/// Renders the HTML body sent with every error status.
pub fn error_page(status: StatusCode, detail: &str) -> String {
    let code = status.as_u16();
    let reason = status.reason_phrase();
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\
         <body><h1>{code} {reason}</h1><p>{detail}</p></body></html>"
    )
}
