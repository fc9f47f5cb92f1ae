//! Cursor pagination over the moderation queue.
//!
//! The queue is an append-only collection plus one [`PaginationState`]
//! value. A load is split into [`PostFeed::begin_load`] and
//! [`PostFeed::finish_load`] so the state lock is never held across the
//! network call.

use bamboo_api_types::{Post, PostPage};
use metrics::counter;
use tracing::{debug, warn};

use crate::application::board::{ApiFailure, PageRequest, PostsApi};
use crate::application::panel::PanelHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationState {
    /// More pages exist and no fetch is running.
    Ready { cursor: String },
    /// A fetch for the page after `cursor` is in flight.
    Loading { cursor: String },
    /// The server reported no further pages.
    Exhausted,
    /// The first page could not be loaded; paging is disabled.
    Unavailable,
}

impl PaginationState {
    /// State after receiving `page`. A page that claims more results but
    /// carries no cursor ends pagination rather than refetching the head.
    pub fn after_page(page: &PostPage) -> Self {
        match page.cursor.as_deref() {
            Some(cursor) if page.has_next && !cursor.is_empty() => Self::Ready {
                cursor: cursor.to_string(),
            },
            _ => Self::Exhausted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready { .. } => "ready",
            Self::Loading { .. } => "loading",
            Self::Exhausted => "exhausted",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Result of completing a page fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// `count` posts were appended starting at `offset`.
    Appended { offset: usize, count: usize },
    /// The fetch failed; cursor and collection are unchanged.
    Failed(ApiFailure),
    /// No fetch was pending, the result was dropped.
    Ignored,
}

/// The moderation queue as loaded so far.
#[derive(Debug, Clone)]
pub struct PostFeed {
    posts: Vec<Post>,
    pagination: PaginationState,
    page_size: u32,
}

impl PostFeed {
    pub fn from_first_page(page: PostPage, page_size: u32) -> Self {
        let pagination = PaginationState::after_page(&page);
        Self {
            posts: page.posts,
            pagination,
            page_size,
        }
    }

    /// Empty feed for a panel whose first load got no response.
    pub fn unavailable(page_size: u32) -> Self {
        Self {
            posts: Vec::new(),
            pagination: PaginationState::Unavailable,
            page_size,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Mark a fetch as started. Returns `None` when a fetch is already in
    /// flight or there is nothing more to load.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        match &self.pagination {
            PaginationState::Ready { cursor } => {
                let cursor = cursor.clone();
                let request = PageRequest::after(self.page_size, cursor.clone());
                self.pagination = PaginationState::Loading { cursor };
                Some(request)
            }
            PaginationState::Loading { .. }
            | PaginationState::Exhausted
            | PaginationState::Unavailable => None,
        }
    }

    /// Complete the pending fetch. The in-flight flag clears whatever the result.
    pub fn finish_load(&mut self, result: Result<PostPage, ApiFailure>) -> LoadOutcome {
        let PaginationState::Loading { cursor } = &self.pagination else {
            return LoadOutcome::Ignored;
        };

        match result {
            Ok(page) => {
                let offset = self.posts.len();
                let count = page.posts.len();
                self.pagination = PaginationState::after_page(&page);
                self.posts.extend(page.posts);
                LoadOutcome::Appended { offset, count }
            }
            Err(failure) => {
                self.pagination = PaginationState::Ready {
                    cursor: cursor.clone(),
                };
                LoadOutcome::Failed(failure)
            }
        }
    }

    /// Swap the entry with `id` for the server's copy. Returns false if the id is gone.
    pub fn replace(&mut self, id: &str, updated: Post) -> bool {
        match self.posts.iter_mut().find(|post| post.id == id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Post> {
        let index = self.posts.iter().position(|post| post.id == id)?;
        Some(self.posts.remove(index))
    }
}

/// What a `load_more` call did, with everything needed to render it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadMore {
    /// A fetch was already running or paging is over; nothing was requested.
    Skipped,
    Appended {
        offset: usize,
        posts: Vec<Post>,
        pagination: PaginationState,
    },
    Failed {
        failure: ApiFailure,
        pagination: PaginationState,
    },
}

/// Fetch and append the next page of the panel's queue.
pub async fn load_more(api: &dyn PostsApi, token: &str, panel: &PanelHandle) -> LoadMore {
    let request = {
        let mut state = panel.lock().await;
        match state.feed.begin_load() {
            Some(request) => request,
            None => {
                debug!(
                    target = "bamboo_admin::feed",
                    state = state.feed.pagination().as_str(),
                    "load more skipped"
                );
                return LoadMore::Skipped;
            }
        }
    };

    let result = api.list_posts(token, request.clone()).await;

    let mut state = panel.lock().await;
    match state.feed.finish_load(result) {
        LoadOutcome::Appended { offset, count } => {
            counter!("bamboo_admin_page_loads_total", "outcome" => "appended").increment(1);
            debug!(
                target = "bamboo_admin::feed",
                cursor = request.cursor.as_deref().unwrap_or(""),
                appended = count,
                "page appended"
            );
            LoadMore::Appended {
                offset,
                posts: state.feed.posts()[offset..offset + count].to_vec(),
                pagination: state.feed.pagination().clone(),
            }
        }
        LoadOutcome::Failed(failure) => {
            counter!("bamboo_admin_page_loads_total", "outcome" => failure.kind()).increment(1);
            warn!(
                target = "bamboo_admin::feed",
                cursor = request.cursor.as_deref().unwrap_or(""),
                error = %failure,
                "page load failed"
            );
            LoadMore::Failed {
                failure,
                pagination: state.feed.pagination().clone(),
            }
        }
        LoadOutcome::Ignored => LoadMore::Skipped,
    }
}
