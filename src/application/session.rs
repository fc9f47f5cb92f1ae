//! Session gate: which view a request gets, given the stored credential.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::application::board::{ApiFailure, PageRequest, PostsApi, TokenIssuer};
use crate::application::notice::Notice;
use crate::application::pagination::PostFeed;
use crate::application::panel::PanelState;
use crate::domain::credential::Credential;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteIntent {
    Login,
    Panel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    RenderLogin,
    RedirectToLogin,
    RedirectToPanel,
    RenderPanel(Credential),
}

/// Route a request. `credential` must already exclude expired tokens.
pub fn evaluate(credential: Option<Credential>, intent: RouteIntent) -> GateDecision {
    match (credential, intent) {
        (None, RouteIntent::Panel) => GateDecision::RedirectToLogin,
        (None, RouteIntent::Login) => GateDecision::RenderLogin,
        (Some(_), RouteIntent::Login) => GateDecision::RedirectToPanel,
        (Some(credential), RouteIntent::Panel) => GateDecision::RenderPanel(credential),
    }
}

#[derive(Debug, Clone)]
pub enum PanelBootstrap {
    /// First page loaded.
    Ready(PanelState),
    /// The board API could not be reached; the panel renders empty with
    /// paging disabled.
    Degraded { state: PanelState, notice: Notice },
    /// The credential was refused. Clear it and go to the login view.
    Expired(Notice),
    /// Any other error status. Also ends the session so the login view
    /// does not bounce straight back here.
    Rejected(Notice),
}

pub struct PageSizes {
    pub initial: u32,
    pub subsequent: u32,
}

/// Load the first page for a freshly rendered panel.
pub async fn bootstrap_panel(
    api: &dyn PostsApi,
    credential: &Credential,
    sizes: &PageSizes,
) -> PanelBootstrap {
    let moderator = credential.moderator();
    match api
        .list_posts(credential.token(), PageRequest::first(sizes.initial))
        .await
    {
        Ok(page) => {
            info!(
                target = "bamboo_admin::gate",
                moderator,
                posts = page.posts.len(),
                has_next = page.has_next,
                "panel bootstrapped"
            );
            let feed = PostFeed::from_first_page(page, sizes.subsequent);
            PanelBootstrap::Ready(PanelState::new(moderator, feed))
        }
        Err(failure @ ApiFailure::NetworkUnreachable(_)) => {
            warn!(
                target = "bamboo_admin::gate",
                moderator,
                error = %failure,
                "panel degraded"
            );
            PanelBootstrap::Degraded {
                state: PanelState::new(moderator, PostFeed::unavailable(sizes.subsequent)),
                notice: Notice::from_failure(&failure),
            }
        }
        Err(ApiFailure::AuthExpired) => {
            info!(
                target = "bamboo_admin::gate",
                moderator, "credential refused during bootstrap"
            );
            PanelBootstrap::Expired(Notice::error("Your session has expired, please sign in again."))
        }
        Err(failure) => {
            warn!(
                target = "bamboo_admin::gate",
                moderator,
                error = %failure,
                "panel bootstrap rejected"
            );
            PanelBootstrap::Rejected(Notice::from_failure(&failure))
        }
    }
}

/// Exchange a passphrase for a usable credential.
pub async fn sign_in(issuer: &dyn TokenIssuer, passphrase: &str) -> Result<Credential, Notice> {
    if passphrase.trim().is_empty() {
        return Err(Notice::error("Enter the passphrase."));
    }

    let token = issuer.issue_token(passphrase).await.map_err(|failure| {
        warn!(target = "bamboo_admin::gate", error = %failure, "sign-in failed");
        Notice::from_login_failure(&failure)
    })?;

    let credential = Credential::decode(token).map_err(|err| {
        warn!(target = "bamboo_admin::gate", error = %err, "issued token is unreadable");
        Notice::error("Something went wrong.")
    })?;
    if credential.is_expired_at(OffsetDateTime::now_utc()) {
        warn!(target = "bamboo_admin::gate", "issued token is already expired");
        return Err(Notice::error("Something went wrong."));
    }

    info!(
        target = "bamboo_admin::gate",
        moderator = credential.moderator(),
        "moderator signed in"
    );
    Ok(credential)
}
