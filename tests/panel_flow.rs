use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use bamboo_admin::{
    application::{
        pagination::PostFeed,
        panel::{PanelRegistry, PanelState},
    },
    config::{PanelSettings, SessionSettings},
    domain::credential::Credential,
    infra::{
        api_client::BoardClient,
        http::{AdminState, build_router},
    },
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::MockServer;
use serde_json::{Value, json};
use std::num::NonZeroU32;
use tower::ServiceExt;
use url::Url;

const FAR_FUTURE: i64 = 4_000_000_000;

fn token(name: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"name":"{name}","exp":{exp}}}"#));
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

fn post_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "content": format!("content of {id}"),
        "createdAt": 1_577_999_999_000i64,
        "status": status,
        "history": []
    })
}

fn router(server: &MockServer) -> (Router, PanelRegistry) {
    let base = Url::parse(&server.base_url()).expect("mock url");
    let client = Arc::new(BoardClient::new(&base).expect("client"));
    let panels = PanelRegistry::new();
    let state = AdminState {
        posts: client.clone(),
        issuer: client,
        panels: panels.clone(),
        session: Arc::new(SessionSettings {
            cookie_name: "token".to_string(),
            cookie_secure: false,
        }),
        panel: PanelSettings {
            initial_page_size: NonZeroU32::new(5).expect("non-zero"),
            page_size: NonZeroU32::new(20).expect("non-zero"),
        },
    };
    (build_router(state), panels)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_form(uri: &str, cookie: Option<&str>, form: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("datastar-request", "true");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    builder.body(Body::from(form.to_string())).expect("request")
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Serve the panel once so the registry holds a feed for `jwt`.
async fn bootstrap(app: &Router, server: &MockServer, jwt: &str, has_next: bool) {
    let first = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("count", "5")
            .query_param_missing("cursor");
        then.status(200).json_body(json!({
            "posts": [post_json("p1", "PENDING"), post_json("p2", "PENDING")],
            "cursor": "c1",
            "hasNext": has_next
        }));
    });

    let response = app
        .clone()
        .oneshot(get("/a1p4ca", Some(jwt)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    first.assert();
}

#[tokio::test]
async fn panel_without_cookie_redirects_to_login() {
    let server = MockServer::start();
    let (app, _) = router(&server);

    let response = app.oneshot(get("/a1p4ca", None)).await.expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca/login");
}

#[tokio::test]
async fn login_page_redirects_a_signed_in_moderator() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);

    let response = app
        .oneshot(get("/a1p4ca/login", Some(&jwt)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca");
}

#[tokio::test]
async fn expired_cookie_is_cleared_on_login_page() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", 1_000);

    let response = app
        .oneshot(get("/a1p4ca/login", Some(&jwt)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        set_cookies(&response)
            .iter()
            .any(|cookie| cookie.starts_with("token=;") || cookie.starts_with("token=\"\""))
    );
    assert!(body_text(response).await.contains("name=\"passphrase\""));
}

#[tokio::test]
async fn login_stores_the_issued_token() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);

    let issue = server.mock(|when, then| {
        when.method("POST")
            .path("/api/admin-token")
            .json_body(json!({ "password": "bamboo" }));
        then.status(200).json_body(json!({ "token": jwt }));
    });

    let request = Request::builder()
        .method("POST")
        .uri("/a1p4ca/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("passphrase=bamboo"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    issue.assert();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca");
    let cookies = set_cookies(&response);
    let stored = cookies
        .iter()
        .find(|cookie| cookie.starts_with("token="))
        .expect("token cookie");
    assert!(stored.contains(&jwt));
    assert!(stored.contains("HttpOnly"));
}

#[tokio::test]
async fn wrong_passphrase_renders_login_with_message() {
    let server = MockServer::start();
    let (app, _) = router(&server);

    server.mock(|when, then| {
        when.method("POST").path("/api/admin-token");
        then.status(401);
    });

    let request = Request::builder()
        .method("POST")
        .uri("/a1p4ca/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("passphrase=nope"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !set_cookies(&response)
            .iter()
            .any(|cookie| cookie.starts_with("token=ey"))
    );
    assert!(body_text(response).await.contains("role=\"alert\""));
}

#[tokio::test]
async fn panel_renders_first_page() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);

    server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("count", "5")
            .header("authorization", format!("Bearer {jwt}"));
        then.status(200).json_body(json!({
            "posts": [post_json("p1", "PENDING"), post_json("p2", "ACCEPTED")],
            "cursor": null,
            "hasNext": false
        }));
    });

    let response = app
        .oneshot(get("/a1p4ca", Some(&jwt)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
    let body = body_text(response).await;
    assert!(body.contains("data-post-id=\"p1\""));
    assert!(body.contains("data-post-id=\"p2\""));
    assert!(body.contains("data-state=\"exhausted\""));
    assert_eq!(panels.len(), 1);
}

#[tokio::test]
async fn refused_credential_on_bootstrap_signs_out() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);

    server.mock(|when, then| {
        when.method("GET").path("/api/posts");
        then.status(401);
    });

    let response = app
        .oneshot(get("/a1p4ca", Some(&jwt)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca/login");
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|cookie| cookie.starts_with("token=")
        && !cookie.contains(&jwt)));
    assert!(cookies.iter().any(|cookie| cookie.starts_with("bamboo_flash=")));
    assert!(panels.is_empty());
}

#[tokio::test]
async fn load_more_appends_the_next_page() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, true).await;

    let next = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("count", "20")
            .query_param("cursor", "c1");
        then.status(200).json_body(json!({
            "posts": [post_json("p3", "PENDING")],
            "cursor": null,
            "hasNext": false
        }));
    });

    let response = app
        .clone()
        .oneshot(post_form("/a1p4ca/posts/more", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    next.assert();
    assert!(body.contains("data-post-id=\"p3\""));
    assert!(body.contains("exhausted"));

    // Exhausted feeds do not call the API again.
    let response = app
        .oneshot(post_form("/a1p4ca/posts/more", Some(&jwt), ""))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    next.assert();
}

#[tokio::test]
async fn refused_credential_during_load_more_signs_out() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, true).await;

    let next = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("count", "20")
            .query_param("cursor", "c1");
        then.status(401);
    });

    let response = app
        .oneshot(post_form("/a1p4ca/posts/more", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|cookie| cookie.starts_with("token=")
        && !cookie.contains(&jwt)));
    assert!(cookies.iter().any(|cookie| cookie.starts_with("bamboo_flash=")));
    let body = body_text(response).await;
    next.assert();
    assert!(body.contains("/a1p4ca/login"));
    assert!(panels.is_empty());
}

#[tokio::test]
async fn failed_load_more_offers_retry_and_keeps_the_list() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, true).await;

    let next = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .query_param("count", "20")
            .query_param("cursor", "c1");
        then.status(500);
    });

    let response = app
        .oneshot(post_form("/a1p4ca/posts/more", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    next.assert();
    assert!(body.contains("Retry"));
    assert!(body.contains("data-admin-toast"));
    assert!(!body.contains("data-post-id=\"p3\""));

    let panel = panels.get(&jwt).expect("panel kept");
    let ids: Vec<String> = panel
        .lock()
        .await
        .feed
        .posts()
        .iter()
        .map(|post| post.id.clone())
        .collect();
    assert_eq!(ids, ["p1", "p2"]);
}

fn expired_panel(panels: &PanelRegistry) -> String {
    let jwt = token("admin", 1_000);
    let credential = Credential::decode(jwt.clone()).expect("credential");
    panels.insert(&credential, PanelState::new("admin", PostFeed::unavailable(20)));
    assert_eq!(panels.len(), 1);
    jwt
}

#[tokio::test]
async fn expired_cookie_on_load_more_drops_the_panel() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = expired_panel(&panels);

    let response = app
        .oneshot(post_form("/a1p4ca/posts/more", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("/a1p4ca/login"));
    assert!(panels.is_empty());
}

#[tokio::test]
async fn expired_cookie_on_panel_page_drops_the_panel() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = expired_panel(&panels);

    let response = app
        .oneshot(get("/a1p4ca", Some(&jwt)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca/login");
    assert!(panels.is_empty());
}

#[tokio::test]
async fn reject_replaces_the_card() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;

    let mut rejected = post_json("p1", "REJECTED");
    rejected["reason"] = json!("spam");
    let patch = server.mock(|when, then| {
        when.method("PATCH")
            .path("/api/posts/p1")
            .json_body(json!({ "status": "REJECTED", "reason": "spam" }));
        then.status(200).json_body(rejected);
    });

    let response = app
        .oneshot(post_form("/a1p4ca/posts/p1/reject", Some(&jwt), "reason=spam"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    patch.assert();
    assert!(body.contains("post-card--rejected"));
    assert!(body.contains("data-admin-toast"));
}

#[tokio::test]
async fn delete_removes_the_card() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;

    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/api/posts/p2");
        then.status(204);
    });

    let response = app
        .oneshot(post_form("/a1p4ca/posts/p2/delete", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    delete.assert();
    assert!(body.contains("data-post-id"));
    assert!(body.contains("remove"));
}

#[tokio::test]
async fn expired_credential_during_action_redirects_to_login() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;

    server.mock(|when, then| {
        when.method("PATCH").path("/api/posts/p1");
        then.status(401);
    });

    let response = app
        .oneshot(post_form("/a1p4ca/posts/p1/accept", Some(&jwt), "fb_link="))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|cookie| cookie.starts_with("bamboo_flash=")));
    let body = body_text(response).await;
    assert!(body.contains("/a1p4ca/login"));
    assert!(panels.is_empty());
}

#[tokio::test]
async fn open_modal_for_unknown_kind_is_rejected() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;

    let response = app
        .oneshot(post_form("/a1p4ca/posts/p1/modal/archive", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn open_modal_renders_the_dialog() {
    let server = MockServer::start();
    let (app, _) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;

    let response = app
        .oneshot(post_form("/a1p4ca/posts/p1/modal/modify", Some(&jwt), ""))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("modal--modify"));
    assert!(body.contains("/a1p4ca/posts/p1/modify"));
}

#[tokio::test]
async fn logout_clears_cookie_and_panel() {
    let server = MockServer::start();
    let (app, panels) = router(&server);
    let jwt = token("admin", FAR_FUTURE);
    bootstrap(&app, &server, &jwt, false).await;
    assert_eq!(panels.len(), 1);

    let request = Request::builder()
        .method("POST")
        .uri("/a1p4ca/logout")
        .header(header::COOKIE, format!("token={jwt}"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/a1p4ca/login");
    assert!(panels.is_empty());
}

#[tokio::test]
async fn health_answers_no_content() {
    let server = MockServer::start();
    let (app, _) = router(&server);

    let response = app.oneshot(get("/health", None)).await.expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
