//! reqwest adapter for the board REST API.

use async_trait::async_trait;
use bamboo_api_types::{
    CreatePostRequest, NewNumberResponse, Post, PostPage, PostPatch, TokenRequest, TokenResponse,
};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::board::{ApiFailure, PageRequest, PostsApi, TokenIssuer};
use crate::infra::error::InfraError;

/// Board API client. Holds no credential; every authenticated call is
/// handed its bearer token.
#[derive(Clone, Debug)]
pub struct BoardClient {
    client: Client,
    base: Url,
}

impl BoardClient {
    pub fn new(base_url: &Url) -> Result<Self, InfraError> {
        let mut base = base_url.clone();
        if base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "`{base_url}` cannot be used as a base URL"
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::client(err.to_string()))?;

        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("bamboo-admin/", env!("CARGO_PKG_VERSION"))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authed(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(token)
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiFailure> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiFailure::NetworkUnreachable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(
            target = "bamboo_admin::api",
            status = status.as_u16(),
            body = %body,
            "board API returned an error status"
        );
        Err(ApiFailure::from_status(status.as_u16(), body))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiFailure> {
        let response = self.dispatch(request).await?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiFailure::NetworkUnreachable(err.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|err| {
            ApiFailure::server_fault(status, format!("failed to parse body: {err}"))
        })
    }
}

#[async_trait]
impl PostsApi for BoardClient {
    async fn list_posts(&self, token: &str, request: PageRequest) -> Result<PostPage, ApiFailure> {
        let mut url = self.endpoint(&["api", "posts"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &request.count.to_string());
            if let Some(cursor) = request.cursor.as_deref() {
                query.append_pair("cursor", cursor);
            }
        }

        self.fetch(self.authed(Method::GET, url, token)).await
    }

    async fn patch_post(
        &self,
        token: &str,
        id: &str,
        patch: &PostPatch,
    ) -> Result<Post, ApiFailure> {
        let url = self.endpoint(&["api", "posts", id]);
        self.fetch(self.authed(Method::PATCH, url, token).json(patch))
            .await
    }

    async fn delete_post(&self, token: &str, id: &str) -> Result<(), ApiFailure> {
        let url = self.endpoint(&["api", "posts", id]);
        self.dispatch(self.authed(Method::DELETE, url, token))
            .await
            .map(|_| ())
    }

    async fn create_post(
        &self,
        token: &str,
        request: &CreatePostRequest,
    ) -> Result<Post, ApiFailure> {
        let url = self.endpoint(&["api", "posts"]);
        self.fetch(self.authed(Method::POST, url, token).json(request))
            .await
    }

    async fn next_number(&self, token: &str) -> Result<u64, ApiFailure> {
        let url = self.endpoint(&["api", "posts", "new-number"]);
        let response: NewNumberResponse = self.fetch(self.authed(Method::GET, url, token)).await?;
        Ok(response.new_number)
    }
}

#[async_trait]
impl TokenIssuer for BoardClient {
    async fn issue_token(&self, passphrase: &str) -> Result<String, ApiFailure> {
        let url = self.endpoint(&["api", "admin-token"]);
        let body = TokenRequest {
            password: passphrase.to_string(),
        };
        let response: TokenResponse = self
            .fetch(self.client.request(Method::POST, url).json(&body))
            .await?;
        Ok(response.token)
    }
}
