//! Hot reload client injection.

use crate::embed::serve::hotreload_tag;
use crate::utils::html::insert_before_tag;
use crate::utils::mime;

/// Inject the hot reload client into HTML bodies when hot reload is on.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str, hot: bool) -> Vec<u8> {
    if hot && mime::is_html(content_type) {
        insert_before_tag(&body, "</body>", hotreload_tag().as_bytes())
    } else {
        body
    }
}
