//! Ports describing the remote board API the panel drives.

use async_trait::async_trait;
use bamboo_api_types::{CreatePostRequest, Post, PostPage, PostPatch};
use thiserror::Error;

/// How a board API call failed, as far as the panel cares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("board API unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("credential rejected by the board API")]
    AuthExpired,
    #[error("board API rejected the request: {0}")]
    BadRequest(String),
    #[error("board API failed with status {status}: {detail}")]
    ServerFault { status: u16, detail: String },
}

impl ApiFailure {
    pub fn server_fault(status: u16, detail: impl Into<String>) -> Self {
        Self::ServerFault {
            status,
            detail: detail.into(),
        }
    }

    /// Map a non-success HTTP status and its body to a failure.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 => Self::AuthExpired,
            400 => Self::BadRequest(body.into()),
            other => Self::server_fault(other, body),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkUnreachable(_) => "network_unreachable",
            Self::AuthExpired => "auth_expired",
            Self::BadRequest(_) => "bad_request",
            Self::ServerFault { .. } => "server_fault",
        }
    }
}

/// Query for one page of the moderation queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub count: u32,
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(count: u32) -> Self {
        Self {
            count,
            cursor: None,
        }
    }

    pub fn after(count: u32, cursor: impl Into<String>) -> Self {
        Self {
            count,
            cursor: Some(cursor.into()),
        }
    }
}

/// Authenticated post operations. Every call takes the bearer token explicitly.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, token: &str, request: PageRequest) -> Result<PostPage, ApiFailure>;

    async fn patch_post(&self, token: &str, id: &str, patch: &PostPatch)
    -> Result<Post, ApiFailure>;

    async fn delete_post(&self, token: &str, id: &str) -> Result<(), ApiFailure>;

    async fn create_post(
        &self,
        token: &str,
        request: &CreatePostRequest,
    ) -> Result<Post, ApiFailure>;

    async fn next_number(&self, token: &str) -> Result<u64, ApiFailure>;
}

/// Exchanges a moderator passphrase for a credential. Unauthenticated.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue_token(&self, passphrase: &str) -> Result<String, ApiFailure>;
}
