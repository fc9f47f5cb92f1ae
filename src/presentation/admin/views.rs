//! View models for the moderation panel pages and datastar fragments.

mod login;
mod posts;
mod toast;

use askama::Template;

pub use login::{AdminLoginTemplate, AdminLoginView, NoticeView};
pub use posts::{
    AdminFeedLoaderTemplate, AdminModalTemplate, AdminPostCardTemplate,
    AdminPostCardsAppendTemplate, FeedLoaderView, ModalView, PostCardView, PostHistoryView,
    format_timestamp_ms,
};
pub use toast::{AdminToastItem, AdminToastStackTemplate};

/// Mount point of the panel.
pub const PANEL_ROOT: &str = "/a1p4ca";
pub const LOGIN_PATH: &str = "/a1p4ca/login";
pub const LOGOUT_PATH: &str = "/a1p4ca/logout";
pub const LOAD_MORE_PATH: &str = "/a1p4ca/posts/more";
pub const MODAL_CLOSE_PATH: &str = "/a1p4ca/modal/close";

/// Base path of the routes acting on one post.
pub fn post_path(id: &str) -> String {
    format!("{PANEL_ROOT}/posts/{id}")
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub title: String,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(title: impl Into<String>, content: T) -> Self {
        Self {
            title: title.into(),
            asset_version: asset_version(),
            content,
        }
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Clone)]
pub struct AdminPanelView {
    pub moderator: String,
    pub cards: Vec<PostCardView>,
    pub loader: FeedLoaderView,
    pub modal: Option<ModalView>,
    pub toasts: Vec<AdminToastItem>,
    pub degraded: bool,
    pub logout_href: &'static str,
}

#[derive(Template)]
#[template(path = "admin/panel.html")]
pub struct AdminPanelTemplate {
    pub view: AdminLayout<AdminPanelView>,
}
