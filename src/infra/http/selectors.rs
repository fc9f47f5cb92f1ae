//! CSS selectors targeted by the panel's datastar responses.

pub const POST_LIST: &str = "[data-role=\"post-list\"]";
pub const FEED_LOADER: &str = "[data-role=\"feed-loader\"]";
pub const MODAL: &str = "[data-role=\"modal\"]";
pub const TOAST_STACK: &str = "[data-admin-toast=\"stack\"]";

/// Selector for the card of one post.
pub fn post_card(id: &str) -> String {
    format!("[data-post-id=\"{}\"]", id.replace('\\', "\\\\").replace('"', "\\\""))
}
