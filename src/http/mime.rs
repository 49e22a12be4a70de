use std::path::Path;

/// Content type for files whose extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Returns the `Content-Type` value for a file, judged by its extension.
///
/// The extension is compared case-insensitively, so `INDEX.HTML` and
/// `index.html` classify the same.
pub fn classify(path: &Path) -> &'static str {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return DEFAULT_MIME_TYPE,
    };

    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        _ => DEFAULT_MIME_TYPE,
    }
}
