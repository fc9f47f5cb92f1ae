use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use datastar::prelude::ElementPatchMode;

use super::{
    selectors::{FEED_LOADER, POST_LIST},
    shared::{Authorized, authorize, push_toasts, render_fragment, session_ended},
    state::AdminState,
};
use crate::{
    application::{
        error::HttpError,
        notice::Notice,
        pagination::{LoadMore, PaginationState, load_more},
        stream::StreamBuilder,
    },
    presentation::admin::views::{
        AdminFeedLoaderTemplate, AdminPostCardsAppendTemplate, FeedLoaderView, PostCardView,
    },
};

/// Scroll sentinel target: append the next page of the queue.
pub(super) async fn load_more_posts(State(state): State<AdminState>, jar: CookieJar) -> Response {
    let Authorized {
        credential,
        panel,
        store,
    } = match authorize(&state, jar) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    let result = match load_more(state.posts.as_ref(), credential.token(), &panel).await {
        LoadMore::Skipped => Ok(StreamBuilder::new()),
        LoadMore::Appended {
            posts, pagination, ..
        } => {
            let cards = posts.iter().map(PostCardView::from_post).collect();
            append_response(cards, &pagination)
        }
        LoadMore::Failed {
            failure,
            pagination,
        } => {
            if failure.is_auth_expired() {
                return session_ended(
                    &state,
                    store,
                    Some(&credential),
                    Notice::from_failure(&failure),
                );
            }
            failure_response(&Notice::from_failure(&failure), &pagination)
        }
    };

    match result {
        Ok(stream) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

fn append_response(
    cards: Vec<PostCardView>,
    pagination: &PaginationState,
) -> Result<StreamBuilder, HttpError> {
    let mut stream = StreamBuilder::new();
    if !cards.is_empty() {
        let html = render_fragment(
            &AdminPostCardsAppendTemplate { cards },
            "infra::http::feed::append_response",
        )?;
        stream.push_patch(html, POST_LIST, ElementPatchMode::Append);
    }
    push_loader(&mut stream, FeedLoaderView::new(pagination))?;
    Ok(stream)
}

fn failure_response(
    notice: &Notice,
    pagination: &PaginationState,
) -> Result<StreamBuilder, HttpError> {
    let mut stream = StreamBuilder::new();
    push_loader(&mut stream, FeedLoaderView::after_failure(pagination))?;
    push_toasts(&mut stream, std::slice::from_ref(notice))?;
    Ok(stream)
}

fn push_loader(stream: &mut StreamBuilder, loader: FeedLoaderView) -> Result<(), HttpError> {
    let html = render_fragment(
        &AdminFeedLoaderTemplate { loader },
        "infra::http::feed::push_loader",
    )?;
    stream.push_patch(html, FEED_LOADER, ElementPatchMode::Replace);
    Ok(())
}
