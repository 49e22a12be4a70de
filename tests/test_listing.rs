use std::fs;

use staticd::static_files::listing::parent_path;
use staticd::static_files::{HtmlEscaped, UrlEncoded, render_index};
use tempfile::tempdir;

#[tokio::test]
async fn test_listing_of_root_has_no_parent_link() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hi").unwrap();

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains("<title>Index of /</title>"));
    assert!(html.contains("<h1>Index of /</h1>"));
    assert!(!html.contains(">..</a>"));
    assert!(html.contains("<a href=\"/a.txt\">a.txt</a></td><td>file</td>"));
    assert!(html.ends_with("</table></body></html>"));
}

#[tokio::test]
async fn test_listing_marks_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("docs")).unwrap();

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/docs/\">docs</a></td><td>directory</td>"));
}

#[tokio::test]
async fn test_listing_of_subdirectory_links_parent() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), "c").unwrap();

    let html = render_index("/a/b", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/a\">..</a></td><td>directory</td>"));
    assert!(html.contains("<a href=\"/a/b/c.txt\">c.txt</a>"));
}

#[tokio::test]
async fn test_listing_with_trailing_slash() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), "c").unwrap();

    let html = render_index("/sub/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/\">..</a>"));
    assert!(html.contains("<a href=\"/sub/c.txt\">c.txt</a>"));
}

#[tokio::test]
async fn test_listing_has_one_row_per_entry() {
    let dir = tempdir().unwrap();
    for name in ["one", "two", "three"] {
        fs::write(dir.path().join(name), name).unwrap();
    }
    fs::create_dir(dir.path().join("four")).unwrap();

    let html = render_index("/x", dir.path()).await.unwrap();

    // three files + one directory + the parent link
    assert_eq!(html.matches("<a href=").count(), 5);
    for name in ["one", "two", "three"] {
        assert!(html.contains(&format!("<a href=\"/x/{name}\">{name}</a>")));
    }
    assert!(html.contains("<a href=\"/x/four/\">four</a>"));
}

#[tokio::test]
async fn test_listing_escapes_entry_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("<script>x.txt"), "x").unwrap();

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains(">&lt;script&gt;x.txt</a>"));
    assert!(html.contains("href=\"/%3Cscript%3Ex.txt\""));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_listing_percent_encodes_hrefs() {
    let dir = tempdir().unwrap();
    for name in ["a+b.txt", "50%.txt", "x#y.txt", "my file.txt", "q?.txt"] {
        fs::write(dir.path().join(name), "x").unwrap();
    }

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/a%2Bb.txt\">a+b.txt</a>"));
    assert!(html.contains("<a href=\"/50%25.txt\">50%.txt</a>"));
    assert!(html.contains("<a href=\"/x%23y.txt\">x#y.txt</a>"));
    assert!(html.contains("<a href=\"/my%20file.txt\">my file.txt</a>"));
    assert!(html.contains("<a href=\"/q%3F.txt\">q?.txt</a>"));
}

#[tokio::test]
async fn test_listing_keeps_encoded_base_path() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("c.txt"), "c").unwrap();

    let html = render_index("/my%20dir/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/my%20dir/c.txt\">c.txt</a>"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_listing_links_non_utf8_names_by_raw_bytes() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "x").unwrap();

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/caf%E9.txt\">caf\u{FFFD}.txt</a>"));
}

#[tokio::test]
async fn test_listing_escapes_title() {
    let dir = tempdir().unwrap();

    let html = render_index("/<b>&\"", dir.path()).await.unwrap();

    assert!(html.contains("<title>Index of /&lt;b&gt;&amp;&quot;</title>"));
}

#[tokio::test]
async fn test_listing_of_missing_directory_fails() {
    let dir = tempdir().unwrap();

    assert!(render_index("/gone", &dir.path().join("gone")).await.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_listing_follows_symlinked_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("real")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let html = render_index("/", dir.path()).await.unwrap();

    assert!(html.contains("<a href=\"/link/\">link</a></td><td>directory</td>"));
}

#[test]
fn test_html_escaped_covers_exactly_four_characters() {
    assert_eq!(
        HtmlEscaped("a&b<c>d\"e'f").to_string(),
        "a&amp;b&lt;c&gt;d&quot;e'f"
    );
}

#[test]
fn test_url_encoded_keeps_only_unreserved_characters() {
    assert_eq!(UrlEncoded(b"Az09-._~").to_string(), "Az09-._~");
    assert_eq!(UrlEncoded(b"<\"&'>").to_string(), "%3C%22%26%27%3E");
}

#[test]
fn test_parent_path() {
    assert_eq!(parent_path("/docs/api"), "/docs");
    assert_eq!(parent_path("/docs"), "/");
}
