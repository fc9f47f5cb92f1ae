//! Modal wiring and moderation actions on single cards.

use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use datastar::prelude::ElementPatchMode;
use serde::Deserialize;

use super::{
    selectors::post_card,
    shared::{
        Authorized, authorize, blank_to_none_opt, push_modal, push_toasts, render_fragment,
        session_ended, toast_response,
    },
    state::AdminState,
};
use crate::{
    application::{
        error::HttpError,
        moderation::{ActionOutcome, ModerationAction, PostEdit, perform_action},
        notice::Notice,
        panel::ModalKind,
        stream::StreamBuilder,
    },
    presentation::admin::views::{AdminPostCardTemplate, PostCardView},
};

pub(super) async fn open_modal(
    State(state): State<AdminState>,
    Path((id, kind)): Path<(String, String)>,
    jar: CookieJar,
) -> Response {
    let Some(kind) = ModalKind::parse(&kind) else {
        return HttpError::new(
            "infra::http::actions::open_modal",
            StatusCode::BAD_REQUEST,
            "Unknown dialog",
            format!("Unsupported modal kind `{kind}`"),
        )
        .into_response();
    };

    let Authorized { panel, .. } = match authorize(&state, jar) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    let opened = panel.lock().await.open_modal(&id, kind);
    if !opened {
        return toast_response(Notice::error("That post is no longer in the list."));
    }

    let mut stream = StreamBuilder::new();
    match push_modal(&mut stream, &panel).await {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn close_modal(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let Authorized { panel, .. } = match authorize(&state, jar) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    panel.lock().await.close_modal();

    let mut stream = StreamBuilder::new();
    match push_modal(&mut stream, &panel).await {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AcceptForm {
    fb_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RejectForm {
    reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ModifyForm {
    number: Option<String>,
    title: Option<String>,
    content: String,
    tag: Option<String>,
    fb_link: Option<String>,
}

impl ModifyForm {
    fn into_edit(self) -> Result<PostEdit, Notice> {
        let number = match blank_to_none_opt(self.number) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(number) if number > 0 => Some(number),
                _ => return Err(Notice::error("Number must be a positive integer.")),
            },
            None => None,
        };

        Ok(PostEdit {
            number,
            title: blank_to_none_opt(self.title),
            content: self.content,
            tag: blank_to_none_opt(self.tag),
            fb_link: blank_to_none_opt(self.fb_link),
        })
    }
}

pub(super) async fn accept_post(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<AcceptForm>,
) -> Response {
    let action = ModerationAction::Accept {
        fb_link: blank_to_none_opt(form.fb_link),
    };
    run_action(&state, jar, &id, action).await
}

pub(super) async fn reject_post(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<RejectForm>,
) -> Response {
    let action = ModerationAction::Reject {
        reason: form.reason.trim().to_string(),
    };
    run_action(&state, jar, &id, action).await
}

pub(super) async fn modify_post(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(form): Form<ModifyForm>,
) -> Response {
    match form.into_edit() {
        Ok(edit) => run_action(&state, jar, &id, ModerationAction::Modify(edit)).await,
        Err(notice) => toast_response(notice),
    }
}

pub(super) async fn delete_post(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    run_action(&state, jar, &id, ModerationAction::Delete).await
}

async fn run_action(
    state: &AdminState,
    jar: CookieJar,
    id: &str,
    action: ModerationAction,
) -> Response {
    let Authorized {
        credential,
        panel,
        store,
    } = match authorize(state, jar) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    let outcome = perform_action(state.posts.as_ref(), credential.token(), &panel, id, action).await;
    if outcome.auth_expired() {
        return session_ended(state, store, Some(&credential), outcome.notice().clone());
    }

    let mut stream = StreamBuilder::new();
    let rendered = async {
        match &outcome {
            ActionOutcome::Updated {
                post,
                replaced: true,
                ..
            } => {
                let html = render_fragment(
                    &AdminPostCardTemplate {
                        card: PostCardView::from_post(post),
                    },
                    "infra::http::actions::run_action",
                )?;
                stream.push_patch(html, &post_card(id), ElementPatchMode::Replace);
                push_modal(&mut stream, &panel).await?;
            }
            ActionOutcome::Deleted { id, .. } => {
                stream.push_removal(&post_card(id));
                push_modal(&mut stream, &panel).await?;
            }
            ActionOutcome::Updated { .. }
            | ActionOutcome::Failed { .. }
            | ActionOutcome::NotLoaded { .. } => {}
        }
        push_toasts(&mut stream, std::slice::from_ref(outcome.notice()))
    }
    .await;

    match rendered {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}
