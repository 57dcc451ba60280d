//! Content type detection for uploaded files.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const MANIFEST: &str = "application/x.arweave-manifest+json";

/// Resolve the content type from the file extension.
///
/// The table is fixed; anything it does not list (including files without an
/// extension) is served as `application/octet-stream`.
pub fn for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        _ => OCTET_STREAM,
    }
}
