//! Per-moderator panel state and the registry that holds it between requests.

use std::sync::Arc;

use bamboo_api_types::Post;
use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{application::pagination::PostFeed, domain::credential::Credential};

/// Which moderation dialog is open, and for which post.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
    #[default]
    None,
    Accepting(Post),
    Rejecting(Post),
    Modifying(Post),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Accept,
    Reject,
    Modify,
}

impl ModalKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Modify => "modify",
        }
    }
}

impl Modal {
    pub fn open(kind: ModalKind, post: Post) -> Self {
        match kind {
            ModalKind::Accept => Self::Accepting(post),
            ModalKind::Reject => Self::Rejecting(post),
            ModalKind::Modify => Self::Modifying(post),
        }
    }

    pub fn kind(&self) -> Option<ModalKind> {
        match self {
            Self::None => None,
            Self::Accepting(_) => Some(ModalKind::Accept),
            Self::Rejecting(_) => Some(ModalKind::Reject),
            Self::Modifying(_) => Some(ModalKind::Modify),
        }
    }

    pub fn post(&self) -> Option<&Post> {
        match self {
            Self::None => None,
            Self::Accepting(post) | Self::Rejecting(post) | Self::Modifying(post) => Some(post),
        }
    }

    pub fn close(&mut self) {
        *self = Self::None;
    }
}

/// Everything the panel shows for one signed-in moderator.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub moderator: String,
    pub feed: PostFeed,
    pub modal: Modal,
}

impl PanelState {
    pub fn new(moderator: impl Into<String>, feed: PostFeed) -> Self {
        Self {
            moderator: moderator.into(),
            feed,
            modal: Modal::None,
        }
    }

    /// Open `kind` for the post with `id`. Returns false if the post is not loaded.
    pub fn open_modal(&mut self, id: &str, kind: ModalKind) -> bool {
        match self.feed.find(id) {
            Some(post) => {
                self.modal = Modal::open(kind, post.clone());
                true
            }
            None => false,
        }
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }
}

pub type PanelHandle = Arc<Mutex<PanelState>>;

#[derive(Clone)]
struct PanelEntry {
    handle: PanelHandle,
    expires_at: OffsetDateTime,
}

/// Live panels keyed by the moderator's bearer token.
#[derive(Clone, Default)]
pub struct PanelRegistry {
    panels: Arc<DashMap<String, PanelEntry>>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly bootstrapped panel, replacing any previous one.
    ///
    /// Panels whose credential has already expired are dropped first.
    pub fn insert(&self, credential: &Credential, state: PanelState) -> PanelHandle {
        self.prune_expired_at(OffsetDateTime::now_utc());

        let handle = Arc::new(Mutex::new(state));
        self.panels.insert(
            credential.token().to_string(),
            PanelEntry {
                handle: handle.clone(),
                expires_at: credential.expires_at(),
            },
        );
        handle
    }

    pub fn get(&self, token: &str) -> Option<PanelHandle> {
        self.panels.get(token).map(|entry| entry.handle.clone())
    }

    pub fn remove(&self, token: &str) -> Option<PanelHandle> {
        self.panels.remove(token).map(|(_, entry)| entry.handle)
    }

    /// Drop every panel whose credential expired at or before `now`.
    pub fn prune_expired_at(&self, now: OffsetDateTime) -> usize {
        let before = self.panels.len();
        self.panels.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.panels.len())
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
