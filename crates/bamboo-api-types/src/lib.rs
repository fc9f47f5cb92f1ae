//! Wire types for the bamboo board posts API.
//!
//! Field names follow the board's JSON (camelCase, upper-case status values).
//! Fields the panel does not interpret are kept in `extra` so a full-field
//! modify sends them back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Pending,
    Accepted,
    Rejected,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Accepted => "accepted",
            PostStatus::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Pending => "Pending",
            PostStatus::Accepted => "Accepted",
            PostStatus::Rejected => "Rejected",
        }
    }
}

/// One prior status transition of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostHistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fb_link: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub history: Vec<PostHistoryEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub has_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptPatch {
    status: PostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fb_link: Option<String>,
}

impl AcceptPatch {
    pub fn new(fb_link: Option<String>) -> Self {
        Self {
            status: PostStatus::Accepted,
            fb_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectPatch {
    status: PostStatus,
    pub reason: String,
}

impl RejectPatch {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            status: PostStatus::Rejected,
            reason: reason.into(),
        }
    }
}

/// Body of `PATCH /api/posts/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PostPatch {
    Accept(AcceptPatch),
    Reject(RejectPatch),
    /// Full replacement of the post's fields.
    Modify(Box<Post>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierAnswer {
    pub id: String,
    pub answer: String,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub verifier: VerifierAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNumberResponse {
    pub new_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_post() -> Value {
        json!({
            "_id": "5e1f",
            "id": "42",
            "number": 1024,
            "title": "hello",
            "content": "first post",
            "fbLink": "https://facebook.com/p/1",
            "createdAt": 1_578_000_000_000_i64,
            "status": "PENDING",
            "history": [{ "status": "PENDING", "createdAt": 1_578_000_000_000_i64 }],
            "ip": "10.0.0.1"
        })
    }

    #[test]
    fn post_reads_board_json() {
        let post: Post = serde_json::from_value(sample_post()).expect("post");
        assert_eq!(post.id, "42");
        assert_eq!(post.object_id.as_deref(), Some("5e1f"));
        assert_eq!(post.number, Some(1024));
        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.fb_link.as_deref(), Some("https://facebook.com/p/1"));
        assert_eq!(post.history.len(), 1);
        assert_eq!(post.extra.get("ip"), Some(&json!("10.0.0.1")));
    }

    #[test]
    fn modify_patch_sends_every_field_back() {
        let post: Post = serde_json::from_value(sample_post()).expect("post");
        let body = serde_json::to_value(PostPatch::Modify(Box::new(post))).expect("body");
        assert_eq!(body, sample_post());
    }

    #[test]
    fn status_patches_carry_their_status() {
        let accept = serde_json::to_value(PostPatch::Accept(AcceptPatch::new(Some(
            "https://fb.com/x".into(),
        ))))
        .expect("accept");
        assert_eq!(accept, json!({ "status": "ACCEPTED", "fbLink": "https://fb.com/x" }));

        let accept_without_link =
            serde_json::to_value(PostPatch::Accept(AcceptPatch::new(None))).expect("accept");
        assert_eq!(accept_without_link, json!({ "status": "ACCEPTED" }));

        let reject =
            serde_json::to_value(PostPatch::Reject(RejectPatch::new("spam"))).expect("reject");
        assert_eq!(reject, json!({ "status": "REJECTED", "reason": "spam" }));
    }

    #[test]
    fn create_request_leaves_out_a_missing_title() {
        let mut request = CreatePostRequest {
            title: None,
            content: "bamboo".into(),
            tag: None,
            verifier: VerifierAnswer {
                id: "v1".into(),
                answer: "forest".into(),
            },
        };
        let body = serde_json::to_value(&request).expect("body");
        assert_eq!(
            body,
            json!({ "content": "bamboo", "verifier": { "id": "v1", "answer": "forest" } })
        );

        request.title = Some("hello".into());
        let body = serde_json::to_value(&request).expect("body");
        assert_eq!(body["title"], json!("hello"));
    }

    #[test]
    fn last_page_may_omit_cursor() {
        let page: PostPage =
            serde_json::from_value(json!({ "posts": [], "hasNext": false })).expect("page");
        assert!(page.cursor.is_none());
        assert!(!page.has_next);
    }
}
