//! Moderation actions on single posts of the loaded queue.
//!
//! A successful action patches exactly one entry of the collection with the
//! server's copy and closes that post's dialog. A failed one changes nothing
//! locally; the dialog stays open so the moderator can resubmit.

use bamboo_api_types::{AcceptPatch, Post, PostPatch, RejectPatch};
use metrics::counter;
use tracing::{info, warn};

use crate::application::board::{ApiFailure, PostsApi};
use crate::application::notice::Notice;
use crate::application::panel::{Modal, PanelHandle};

/// Editable fields of the modify dialog; everything else is carried over
/// from the loaded post.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostEdit {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub content: String,
    pub tag: Option<String>,
    pub fb_link: Option<String>,
}

impl PostEdit {
    fn apply(self, mut post: Post) -> Post {
        post.number = self.number;
        post.title = self.title;
        post.content = self.content;
        post.tag = self.tag;
        post.fb_link = self.fb_link;
        post
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    Accept { fb_link: Option<String> },
    Reject { reason: String },
    Modify(PostEdit),
    Delete,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept { .. } => "accept",
            Self::Reject { .. } => "reject",
            Self::Modify(_) => "modify",
            Self::Delete => "delete",
        }
    }

    fn validate(&self) -> Result<(), ApiFailure> {
        match self {
            Self::Reject { reason } if reason.trim().is_empty() => Err(ApiFailure::BadRequest(
                "a rejection reason is required".into(),
            )),
            Self::Modify(edit) if edit.content.trim().is_empty() => {
                Err(ApiFailure::BadRequest("post content is required".into()))
            }
            _ => Ok(()),
        }
    }

    fn success_notice(&self) -> Notice {
        match self {
            Self::Accept { .. } => Notice::success("Post accepted."),
            Self::Reject { .. } => Notice::success("Post rejected."),
            Self::Modify(_) => Notice::success("Post updated."),
            Self::Delete => Notice::success("Post deleted."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The server accepted the change. `replaced` is false when the post
    /// left the collection while the call was in flight.
    Updated {
        post: Post,
        replaced: bool,
        notice: Notice,
    },
    Deleted {
        id: String,
        notice: Notice,
    },
    /// Nothing changed locally; the dialog stays open.
    Failed {
        failure: ApiFailure,
        notice: Notice,
    },
    /// The id does not name a loaded post; no call was made.
    NotLoaded {
        notice: Notice,
    },
}

impl ActionOutcome {
    pub fn notice(&self) -> &Notice {
        match self {
            Self::Updated { notice, .. }
            | Self::Deleted { notice, .. }
            | Self::Failed { notice, .. }
            | Self::NotLoaded { notice } => notice,
        }
    }

    pub fn auth_expired(&self) -> bool {
        matches!(self, Self::Failed { failure, .. } if failure.is_auth_expired())
    }
}

/// Run `action` against the post with `id` and fold the result into the panel.
pub async fn perform_action(
    api: &dyn PostsApi,
    token: &str,
    panel: &PanelHandle,
    id: &str,
    action: ModerationAction,
) -> ActionOutcome {
    let kind = action.as_str();

    let current = {
        let state = panel.lock().await;
        state.feed.find(id).cloned()
    };
    let Some(current) = current else {
        return ActionOutcome::NotLoaded {
            notice: Notice::error("That post is no longer in the list."),
        };
    };

    if let Err(failure) = action.validate() {
        return failed(kind, id, failure);
    }

    let notice = action.success_notice();
    let result = match action {
        ModerationAction::Accept { fb_link } => api
            .patch_post(token, id, &PostPatch::Accept(AcceptPatch::new(fb_link)))
            .await
            .map(Some),
        ModerationAction::Reject { reason } => api
            .patch_post(token, id, &PostPatch::Reject(RejectPatch::new(reason)))
            .await
            .map(Some),
        ModerationAction::Modify(edit) => {
            let patch = PostPatch::Modify(Box::new(edit.apply(current)));
            api.patch_post(token, id, &patch).await.map(Some)
        }
        ModerationAction::Delete => api.delete_post(token, id).await.map(|()| None),
    };

    match result {
        Ok(Some(updated)) => {
            let mut state = panel.lock().await;
            let replaced = state.feed.replace(id, updated.clone());
            close_modal_for(&mut state.modal, id);
            record(kind, "applied");
            info!(
                target = "bamboo_admin::moderation",
                action = kind,
                post_id = id,
                status = updated.status.as_str(),
                replaced,
                "moderation action applied"
            );
            ActionOutcome::Updated {
                post: updated,
                replaced,
                notice,
            }
        }
        Ok(None) => {
            let mut state = panel.lock().await;
            state.feed.remove(id);
            close_modal_for(&mut state.modal, id);
            record(kind, "applied");
            info!(
                target = "bamboo_admin::moderation",
                action = kind,
                post_id = id,
                "post deleted"
            );
            ActionOutcome::Deleted {
                id: id.to_string(),
                notice,
            }
        }
        Err(failure) => failed(kind, id, failure),
    }
}

fn failed(kind: &'static str, id: &str, failure: ApiFailure) -> ActionOutcome {
    record(kind, failure.kind());
    warn!(
        target = "bamboo_admin::moderation",
        action = kind,
        post_id = id,
        error = %failure,
        "moderation action failed"
    );
    ActionOutcome::Failed {
        notice: Notice::from_failure(&failure),
        failure,
    }
}

fn close_modal_for(modal: &mut Modal, id: &str) {
    if modal.post().is_some_and(|post| post.id == id) {
        modal.close();
    }
}

fn record(action: &'static str, outcome: &'static str) {
    counter!(
        "bamboo_admin_moderation_actions_total",
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}
