//! HTTP surface of the moderation panel.

mod actions;
mod feed;
mod gate;
mod middleware;
mod selectors;
mod shared;
mod state;

pub use state::AdminState;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{infra::assets, presentation::admin::views::PANEL_ROOT};
use middleware::{log_responses, set_request_context};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// Build the router serving the panel under its mount point.
pub fn build_router(state: AdminState) -> Router {
    let panel = Router::new()
        .route("/", get(gate::panel_page))
        .route("/login", get(gate::login_page).post(gate::login_submit))
        .route("/logout", post(gate::logout))
        .route("/posts/more", post(feed::load_more_posts))
        .route("/modal/close", post(actions::close_modal))
        .route("/posts/{id}/modal/{kind}", post(actions::open_modal))
        .route("/posts/{id}/accept", post(actions::accept_post))
        .route("/posts/{id}/reject", post(actions::reject_post))
        .route("/posts/{id}/modify", post(actions::modify_post))
        .route("/posts/{id}/delete", post(actions::delete_post));

    Router::new()
        .route("/", get(root_redirect))
        .nest(PANEL_ROOT, panel)
        .route("/static/admin/admin.css", get(assets::serve_admin_stylesheet))
        .route("/health", get(health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn root_redirect() -> Redirect {
    Redirect::to(PANEL_ROOT)
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
