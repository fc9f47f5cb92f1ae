use askama::Template;
use bamboo_api_types::{Post, PostHistoryEntry};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::application::pagination::PaginationState;
use crate::application::panel::Modal;

use super::{LOAD_MORE_PATH, MODAL_CLOSE_PATH, post_path};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

/// Render a millisecond epoch timestamp for display.
pub fn format_timestamp_ms(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|at| at.format(TIMESTAMP_FORMAT).ok())
        .unwrap_or_else(|| ms.to_string())
}

#[derive(Clone)]
pub struct PostHistoryView {
    pub status_label: &'static str,
    pub reason: Option<String>,
    pub at_label: Option<String>,
}

impl From<&PostHistoryEntry> for PostHistoryView {
    fn from(entry: &PostHistoryEntry) -> Self {
        Self {
            status_label: entry.status.map_or("Updated", |status| status.label()),
            reason: entry.reason.clone(),
            at_label: entry.created_at.map(format_timestamp_ms),
        }
    }
}

#[derive(Clone)]
pub struct PostCardView {
    pub id: String,
    pub number_label: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub tag: Option<String>,
    pub fb_link: Option<String>,
    pub status_key: &'static str,
    pub status_label: &'static str,
    pub reason: Option<String>,
    pub created_label: String,
    pub history: Vec<PostHistoryView>,
    pub base_href: String,
}

impl PostCardView {
    pub fn from_post(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            number_label: post.number.map(|number| format!("#{number}")),
            title: post.title.clone(),
            content: post.content.clone(),
            tag: post.tag.clone(),
            fb_link: post.fb_link.clone(),
            status_key: post.status.as_str(),
            status_label: post.status.label(),
            reason: post.reason.clone(),
            created_label: format_timestamp_ms(post.created_at),
            history: post.history.iter().map(PostHistoryView::from).collect(),
            base_href: post_path(&post.id),
        }
    }
}

#[derive(Template)]
#[template(path = "admin/post_card.html")]
pub struct AdminPostCardTemplate {
    pub card: PostCardView,
}

#[derive(Template)]
#[template(path = "admin/post_cards_append.html")]
pub struct AdminPostCardsAppendTemplate {
    pub cards: Vec<PostCardView>,
}

/// The scroll sentinel at the end of the list.
#[derive(Clone)]
pub struct FeedLoaderView {
    pub state: &'static str,
    pub can_load: bool,
    pub retry: bool,
    pub load_more_href: &'static str,
}

impl FeedLoaderView {
    pub fn new(pagination: &PaginationState) -> Self {
        Self {
            state: pagination.as_str(),
            can_load: matches!(pagination, PaginationState::Ready { .. }),
            retry: false,
            load_more_href: LOAD_MORE_PATH,
        }
    }

    /// Loader after a failed fetch: waits for an explicit retry instead of
    /// firing again as soon as it is visible.
    pub fn after_failure(pagination: &PaginationState) -> Self {
        let view = Self::new(pagination);
        Self {
            can_load: false,
            retry: view.can_load,
            ..view
        }
    }
}

#[derive(Template)]
#[template(path = "admin/feed_loader.html")]
pub struct AdminFeedLoaderTemplate {
    pub loader: FeedLoaderView,
}

#[derive(Clone)]
pub struct ModalView {
    pub kind: &'static str,
    pub heading: &'static str,
    pub card: PostCardView,
    pub action_href: String,
    pub close_href: &'static str,
    pub number_value: String,
    pub title_value: String,
    pub tag_value: String,
    pub fb_link_value: String,
}

impl ModalView {
    pub fn from_modal(modal: &Modal) -> Option<Self> {
        let kind = modal.kind()?;
        let post = modal.post()?;
        let heading = match modal {
            Modal::Accepting(_) => "Accept post",
            Modal::Rejecting(_) => "Reject post",
            Modal::Modifying(_) | Modal::None => "Edit post",
        };

        Some(Self {
            kind: kind.as_str(),
            heading,
            card: PostCardView::from_post(post),
            action_href: format!("{}/{}", post_path(&post.id), kind.as_str()),
            close_href: MODAL_CLOSE_PATH,
            number_value: post.number.map(|n| n.to_string()).unwrap_or_default(),
            title_value: post.title.clone().unwrap_or_default(),
            tag_value: post.tag.clone().unwrap_or_default(),
            fb_link_value: post.fb_link.clone().unwrap_or_default(),
        })
    }
}

#[derive(Template)]
#[template(path = "admin/modal.html")]
pub struct AdminModalTemplate {
    pub view: Option<ModalView>,
}
