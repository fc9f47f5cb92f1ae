use askama::{Error as AskamaError, Template};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use datastar::prelude::ElementPatchMode;
use tracing::info;

use super::selectors::{MODAL, TOAST_STACK};
use super::state::AdminState;
use crate::{
    application::{
        error::HttpError, notice::Notice, panel::PanelHandle, stream::StreamBuilder,
    },
    domain::credential::Credential,
    infra::token_store::TokenStore,
    presentation::{
        admin::views::{
            AdminModalTemplate, AdminToastItem, AdminToastStackTemplate, LOGIN_PATH, ModalView,
            PANEL_ROOT,
        },
        views::TemplateRenderError,
    },
};

pub(super) fn blank_to_none_opt(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(super) fn template_render_http_error(
    source: &'static str,
    message: &'static str,
    err: AskamaError,
) -> HttpError {
    HttpError::from(TemplateRenderError::new(source, message, err))
}

pub(super) fn render_fragment<T: Template>(
    template: &T,
    source: &'static str,
) -> Result<String, HttpError> {
    template
        .render()
        .map_err(|err| template_render_http_error(source, "Template rendering failed", err))
}

pub(super) fn push_toasts(stream: &mut StreamBuilder, notices: &[Notice]) -> Result<(), HttpError> {
    let toasts = notices
        .iter()
        .map(AdminToastItem::from_notice)
        .collect::<Vec<_>>();

    let html = render_fragment(
        &AdminToastStackTemplate { toasts },
        "infra::http::push_toasts",
    )?;

    stream.push_patch(html, TOAST_STACK, ElementPatchMode::Replace);
    Ok(())
}

/// Re-render the modal container from the panel's current modal.
pub(super) async fn push_modal(
    stream: &mut StreamBuilder,
    panel: &PanelHandle,
) -> Result<(), HttpError> {
    let view = {
        let state = panel.lock().await;
        ModalView::from_modal(&state.modal)
    };
    let html = render_fragment(&AdminModalTemplate { view }, "infra::http::push_modal")?;
    stream.push_patch(html, MODAL, ElementPatchMode::Replace);
    Ok(())
}

/// A single toast as the whole response.
pub(super) fn toast_response(notice: Notice) -> Response {
    let mut stream = StreamBuilder::new();
    if let Err(err) = push_toasts(&mut stream, &[notice]) {
        return err.into_response();
    }
    stream.into_response()
}

/// A signed-in moderator with a live panel.
pub(super) struct Authorized {
    pub credential: Credential,
    pub panel: PanelHandle,
    pub store: TokenStore,
}

/// Resolve the request's credential and panel, or the response that ends
/// the datastar exchange.
pub(super) fn authorize(state: &AdminState, jar: CookieJar) -> Result<Authorized, Response> {
    let store = TokenStore::new(jar, &state.session);
    let Some(credential) = store.credential() else {
        return Err(session_ended(
            state,
            store,
            None,
            Notice::error("Please sign in."),
        ));
    };

    match state.panels.get(credential.token()) {
        Some(panel) => Ok(Authorized {
            credential,
            panel,
            store,
        }),
        None => {
            // No panel after a restart; a full reload bootstraps a new one.
            let mut stream = StreamBuilder::new();
            stream.push_redirect(PANEL_ROOT);
            Err(stream.into_response())
        }
    }
}

/// Drop the session and send the browser to the login view with `notice`.
pub(super) fn session_ended(
    state: &AdminState,
    store: TokenStore,
    credential: Option<&Credential>,
    notice: Notice,
) -> Response {
    if let Some(token) = credential.map(Credential::token).or_else(|| store.get()) {
        state.panels.remove(token);
    }
    if let Some(credential) = credential {
        info!(
            target = "bamboo_admin::gate",
            moderator = credential.moderator(),
            "session ended by the board API"
        );
    }

    let jar = store.remove().with_flash(&notice).into_jar();
    let mut stream = StreamBuilder::new();
    stream.push_redirect(LOGIN_PATH);
    (jar, stream.into_response()).into_response()
}
