use std::path::Path;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::mime;
use crate::http::response::{Body, Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.0";

/// Chunk size used when streaming file bodies.
pub const SEND_CHUNK_SIZE: usize = 16384;

/// Serializes the status line, headers and the blank separator line.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes `response` to `stream`, leaving out the body when `head_only`.
///
/// File bodies are streamed in `SEND_CHUNK_SIZE` chunks and never exceed the
/// advertised `Content-Length`. Any write failure is returned as is; there
/// is no retry.
pub async fn write_response<W>(
    stream: &mut W,
    response: Response,
    head_only: bool,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream
        .write_all(&serialize_head(&response))
        .await
        .context("failed to write response head")?;

    if !head_only {
        let limit = response.content_length();
        match response.body {
            Body::Empty => {}
            Body::Bytes(bytes) => {
                stream
                    .write_all(&bytes)
                    .await
                    .context("failed to write response body")?;
            }
            Body::File(file) => {
                stream_file(stream, file, limit.unwrap_or(u64::MAX)).await?;
            }
        }
    }

    stream.flush().await.context("failed to flush response")?;
    Ok(())
}

async fn stream_file<W>(stream: &mut W, file: File, limit: u64) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut file = file.take(limit);
    let mut chunk = vec![0u8; SEND_CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut chunk)
            .await
            .context("failed to read file body")?;
        if n == 0 {
            break;
        }
        stream
            .write_all(&chunk[..n])
            .await
            .context("connection closed while writing file body")?;
    }

    Ok(())
}

/// Opens `path` for serving.
///
/// Directories, missing files and files that cannot be opened all come back
/// as a 404 response.
pub async fn file_response(path: &Path) -> Response {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if !metadata.is_dir() => metadata,
        _ => return Response::not_found(),
    };

    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "failed to open file");
            return Response::not_found();
        }
    };

    Response::file(file, metadata.len(), mime::classify(path))
}

/// Sends the file at `path`, or a 404 if it cannot be served.
///
/// Returns the status that was sent. This is `file_response` followed by
/// `write_response` in one call; the connection handler does the two steps
/// separately because it picks the response before writing it.
pub async fn send_file<W>(stream: &mut W, path: &Path, head_only: bool) -> anyhow::Result<StatusCode>
where
    W: AsyncWrite + Unpin,
{
    let response = file_response(path).await;
    let status = response.status;
    write_response(stream, response, head_only).await?;
    Ok(status)
}

/// Sends an HTML error page for `status` with `detail` as its message.
///
/// Shorthand for `write_response` with `Response::error`.
pub async fn send_error<W>(stream: &mut W, status: StatusCode, detail: &str) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_response(stream, Response::error(status, detail), false).await
}
