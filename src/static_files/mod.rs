//! Mapping request paths onto the document root.
//!
//! - **`resolver`**: URL decoding, canonicalization and the containment check
//! - **`listing`**: HTML index pages for directories without an `index.html`

pub mod listing;
pub mod resolver;

pub use listing::{HtmlEscaped, UrlEncoded, render_index};
pub use resolver::{ResolveError, ResolvedTarget, resolve, resolve_index, url_decode};
