use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::request::{Method, Request};

/// Upper bound on the bytes read while looking for the end of the headers.
pub const MAX_REQUEST_SIZE: usize = 8192;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no request data received")]
    Empty,
    #[error("request line is not terminated by CRLF")]
    UnterminatedRequestLine,
    #[error("request line is not valid UTF-8")]
    InvalidEncoding,
    #[error("request line is missing the {0}")]
    MissingToken(&'static str),
}

/// Reads one request from `reader` and parses its request line.
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let buf = read_request_head(reader).await;
    parse_request_line(&buf)
}

/// Reads until CRLFCRLF, EOF, a read error, or `MAX_REQUEST_SIZE` bytes.
///
/// Whatever was received up to that point is returned; a failing read only
/// ends the loop. When the terminator is found the buffer is cut right after
/// it.
pub async fn read_request_head<R>(reader: &mut R) -> BytesMut
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(MAX_REQUEST_SIZE);

    while buffer.len() < MAX_REQUEST_SIZE {
        let mut temp = [0u8; 1024];
        let want = temp.len().min(MAX_REQUEST_SIZE - buffer.len());

        let n = match reader.read(&mut temp[..want]).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "read failed while receiving request");
                break;
            }
        };

        // The terminator may straddle the previous read.
        let search_from = buffer.len().saturating_sub(3);
        buffer.extend_from_slice(&temp[..n]);

        if let Some(pos) = find_headers_end(&buffer[search_from..]) {
            buffer.truncate(search_from + pos + 4);
            break;
        }
    }

    buffer
}

/// Parses `METHOD SP TARGET SP VERSION CRLF` out of a request head.
pub fn parse_request_line(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let line_end = buf
        .windows(2)
        .position(|w| w == b"\r\n")
        .ok_or(ParseError::UnterminatedRequestLine)?;

    let line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| ParseError::InvalidEncoding)?;

    let (method, rest) = line
        .split_once(' ')
        .ok_or(ParseError::MissingToken("request target"))?;
    let (path, version) = rest
        .split_once(' ')
        .ok_or(ParseError::MissingToken("version"))?;

    Ok(Request {
        method: Method::from(method),
        path: path.to_string(),
        version: version.to_string(),
    })
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
