use std::borrow::Cow;
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

const STYLE: &str = "body{font-family:system-ui,Segoe UI,Arial,sans-serif;margin:1em auto;max-width:900px}\
a{text-decoration:none;color:#05c}a:hover{text-decoration:underline}\
table{border-collapse:collapse;width:100%}\
th,td{padding:4px 8px;border-bottom:1px solid #eee;text-align:left}";

/// Escape & < > " into HTML entities.
pub struct HtmlEscaped<'a>(pub &'a str);

impl std::fmt::Display for HtmlEscaped<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Percent-encode every byte outside the RFC 3986 unreserved set.
pub struct UrlEncoded<'a>(pub &'a [u8]);

impl std::fmt::Display for UrlEncoded<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in self.0 {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                f.write_char(char::from(b))?;
            } else {
                write!(f, "%{:02X}", b)?;
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    match name.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// Renders the index page for the directory `dir`, reached through `url_path`.
///
/// Entries appear in the order `read_dir` yields them. `url_path` is used in
/// links as received, so it is expected to still be percent-encoded; entry
/// names are encoded from their raw bytes.
pub async fn render_index(url_path: &str, dir: &Path) -> io::Result<String> {
    let mut entries = tokio::fs::read_dir(dir).await?;

    let title = HtmlEscaped(url_path);
    let mut html = String::with_capacity(8192);
    let _ = write!(
        html,
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <title>Index of {title}</title><style>{STYLE}</style></head>\
         <body><h1>Index of {title}</h1><table><tr><th>Name</th><th>Type</th></tr>"
    );

    if url_path != "/" {
        let _ = write!(
            html,
            "<tr><td><a href=\"{}\">..</a></td><td>directory</td></tr>",
            HtmlEscaped(parent_path(url_path))
        );
    }

    let base = url_path.trim_end_matches('/');
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        if file_name == "." || file_name == ".." {
            continue;
        }
        let name = file_name.to_string_lossy();

        // Follows symlinks, so a link to a directory is listed as one.
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        let href = format!(
            "{}/{}{}",
            base,
            UrlEncoded(&name_bytes(&file_name)),
            if is_dir { "/" } else { "" }
        );
        let _ = write!(
            html,
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
            HtmlEscaped(&href),
            HtmlEscaped(&name),
            if is_dir { "directory" } else { "file" }
        );
    }

    html.push_str("</table></body></html>");
    Ok(html)
}

/// Parent of a URL path: trailing slashes dropped, then cut at the last `/`.
pub fn parent_path(url_path: &str) -> &str {
    let trimmed = url_path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) if idx > 0 => &trimmed[..idx],
        _ => "/",
    }
}
