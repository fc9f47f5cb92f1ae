//! Full-page routes: the panel, the login view and logout.

use axum::{
    extract::{Form, State},
    http::{StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;

use super::state::AdminState;
use crate::{
    application::{
        notice::Notice,
        pagination::PaginationState,
        panel::PanelState,
        session::{GateDecision, PanelBootstrap, RouteIntent, bootstrap_panel, evaluate, sign_in},
    },
    domain::credential::Credential,
    infra::token_store::TokenStore,
    presentation::{
        admin::views::{
            AdminLayout, AdminLoginTemplate, AdminLoginView, AdminPanelTemplate, AdminPanelView,
            AdminToastItem, FeedLoaderView, LOGIN_PATH, LOGOUT_PATH, NoticeView, PANEL_ROOT,
            PostCardView,
        },
        views::render_template,
    },
};

const PANEL_TITLE: &str = "대나무숲 관리자";

pub(super) async fn panel_page(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let (store, flash) = TokenStore::new(jar, &state.session).take_flash();

    match evaluate(store.credential(), RouteIntent::Panel) {
        GateDecision::RenderPanel(credential) => {
            render_panel(&state, store, credential, flash).await
        }
        GateDecision::RedirectToPanel => {
            (store.into_jar(), Redirect::to(PANEL_ROOT)).into_response()
        }
        GateDecision::RedirectToLogin | GateDecision::RenderLogin => {
            let mut store = clear_stale(&state, store);
            if let Some(notice) = flash {
                store = store.with_flash(&notice);
            }
            (store.into_jar(), Redirect::to(LOGIN_PATH)).into_response()
        }
    }
}

async fn render_panel(
    state: &AdminState,
    store: TokenStore,
    credential: Credential,
    flash: Option<Notice>,
) -> Response {
    let mut notices: Vec<Notice> = flash.into_iter().collect();

    let panel = match bootstrap_panel(state.posts.as_ref(), &credential, &state.page_sizes()).await
    {
        PanelBootstrap::Ready(panel) => panel,
        PanelBootstrap::Degraded {
            state: panel,
            notice,
        } => {
            notices.push(notice);
            panel
        }
        PanelBootstrap::Expired(notice) | PanelBootstrap::Rejected(notice) => {
            state.panels.remove(credential.token());
            let jar = store.remove().with_flash(&notice).into_jar();
            return (jar, Redirect::to(LOGIN_PATH)).into_response();
        }
    };

    let view = panel_view(&panel, &notices);
    let template = AdminPanelTemplate {
        view: AdminLayout::new(PANEL_TITLE, view),
    };
    match render_template(template) {
        Ok(html) => {
            state.panels.insert(&credential, panel);
            info!(
                target = "bamboo_admin::gate",
                moderator = credential.moderator(),
                panels = state.panels.len(),
                "panel bootstrapped"
            );
            (store.into_jar(), [(CACHE_CONTROL, "no-store")], html).into_response()
        }
        Err(err) => err.into_response(),
    }
}

fn panel_view(panel: &PanelState, notices: &[Notice]) -> AdminPanelView {
    let pagination = panel.feed.pagination();
    AdminPanelView {
        moderator: panel.moderator.clone(),
        cards: panel
            .feed
            .posts()
            .iter()
            .map(PostCardView::from_post)
            .collect(),
        loader: FeedLoaderView::new(pagination),
        modal: None,
        toasts: notices.iter().map(AdminToastItem::from_notice).collect(),
        degraded: matches!(pagination, PaginationState::Unavailable),
        logout_href: LOGOUT_PATH,
    }
}

pub(super) async fn login_page(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let (store, flash) = TokenStore::new(jar, &state.session).take_flash();

    match evaluate(store.credential(), RouteIntent::Login) {
        GateDecision::RedirectToPanel => {
            (store.into_jar(), Redirect::to(PANEL_ROOT)).into_response()
        }
        _ => render_login(clear_stale(&state, store), flash.as_ref()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LoginForm {
    passphrase: String,
}

pub(super) async fn login_submit(
    State(state): State<AdminState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let store = TokenStore::new(jar, &state.session);
    if let GateDecision::RedirectToPanel = evaluate(store.credential(), RouteIntent::Login) {
        return (store.into_jar(), Redirect::to(PANEL_ROOT)).into_response();
    }

    match sign_in(state.issuer.as_ref(), &form.passphrase).await {
        Ok(credential) => {
            let jar = store
                .set(credential.token(), credential.expires_at())
                .into_jar();
            (jar, Redirect::to(PANEL_ROOT)).into_response()
        }
        Err(notice) => render_login(clear_stale(&state, store), Some(&notice)),
    }
}

pub(super) async fn logout(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let store = TokenStore::new(jar, &state.session);
    if let Some(token) = store.get() {
        state.panels.remove(token);
    }
    info!(target = "bamboo_admin::gate", "moderator signed out");

    let jar = store
        .remove()
        .with_flash(&Notice::success("Signed out."))
        .into_jar();
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

fn render_login(store: TokenStore, notice: Option<&Notice>) -> Response {
    let view = AdminLoginView {
        action: LOGIN_PATH,
        notice: notice.map(|notice| NoticeView {
            kind: notice.kind.as_str(),
            text: notice.text.clone(),
        }),
    };
    let template = AdminLoginTemplate {
        view: AdminLayout::new(PANEL_TITLE, view),
    };
    match render_template(template) {
        Ok(html) => (StatusCode::OK, store.into_jar(), html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Drop a cookie that no longer holds a usable credential, and its panel.
fn clear_stale(state: &AdminState, store: TokenStore) -> TokenStore {
    let stale = store
        .get()
        .filter(|_| store.credential().is_none())
        .map(str::to_owned);
    match stale {
        Some(token) => {
            state.panels.remove(&token);
            store.remove()
        }
        None => store,
    }
}
