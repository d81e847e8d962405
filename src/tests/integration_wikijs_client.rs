use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use crate::AppState;
use crate::build_app;
use crate::domain::{ListOrder, NewPage, PageChanges, PagePath, PageUpdate};
use crate::error::ProxyError;
use crate::services::PageService;
use crate::tests::test_config;
use crate::upstream::{WikiBackend, WikiJsClient};

// --- Fake Wiki.js ---
// a real HTTP server on a random local port that answers GraphQL POSTs with
// canned replies in order (the last one repeats) and remembers what it was
// sent. Like Wiki.js, it refuses a `pages.update` without content.
#[derive(Clone)]
struct FakeWiki {
    replies: Arc<Mutex<VecDeque<(u16, Value)>>>,
    delay: Duration,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

#[derive(Clone, Debug)]
struct SeenRequest {
    authorization: Option<String>,
    body: Value,
}

impl FakeWiki {
    fn replying(status: u16, reply: Value) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from([(status, reply)]))),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn then(self, status: u16, reply: Value) -> Self {
        self.replies.lock().unwrap().push_back((status, reply));
        self
    }

    fn next_reply(&self) -> (u16, Value) {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        }
    }

    fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn graphql_handler(
    State(fake): State<FakeWiki>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let empty_update = body["query"].as_str().unwrap_or_default().contains("update(")
        && body["variables"]["content"]
            .as_str()
            .is_none_or(|c| c.trim().is_empty());
    fake.seen.lock().unwrap().push(SeenRequest {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    });
    if !fake.delay.is_zero() {
        tokio::time::sleep(fake.delay).await;
    }
    if empty_update {
        let reply = rejected_update(6004, "PageEmptyContent", "Page content cannot be empty.");
        return (StatusCode::OK, Json(reply));
    }
    let (status, reply) = fake.next_reply();
    (StatusCode::from_u16(status).unwrap(), Json(reply))
}

fn rejected_update(code: i64, slug: &str, message: &str) -> Value {
    json!({
        "data": { "pages": { "update": {
            "responseResult": { "succeeded": false, "errorCode": code, "slug": slug, "message": message },
            "page": null
        }}}
    })
}

fn stored_page(content: Value) -> Value {
    json!({
        "data": { "pages": { "single": {
            "id": 3,
            "path": "a",
            "title": "Old",
            "content": content,
            "description": "d",
            "locale": "en",
            "isPublished": true,
            "tags": [{ "tag": "x" }]
        }}}
    })
}

// starts the fake and returns its base URL
async fn spawn_fake_wiki(fake: FakeWiki) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .with_state(fake);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client_for(fake: &FakeWiki) -> WikiJsClient {
    let url = spawn_fake_wiki(fake.clone()).await;
    WikiJsClient::new(&test_config(&url)).unwrap()
}

#[tokio::test]
async fn test_get_page_sends_bearer_and_upstream_path() {
    let fake = FakeWiki::replying(200, json!({
        "data": { "pages": { "singleByPath": {
            "id": 7,
            "path": "HW/Workstation-01",
            "title": "Workstation 01",
            "content": "# Specs",
            "description": "Office PC",
            "locale": "en",
            "isPublished": true,
            "createdAt": "2024-03-01T10:00:00.000Z",
            "updatedAt": "2024-03-01T10:00:00.000Z",
            "tags": [{ "tag": "hardware" }]
        }}}
    }));
    let client = client_for(&fake).await;

    let path = PagePath::parse("/HW/Workstation-01").unwrap();
    let page = client.page_by_path(&path, "en").await.unwrap().unwrap();

    assert_eq!(page.id, 7);
    assert_eq!(page.path, "/HW/Workstation-01");
    assert_eq!(page.tags, vec!["hardware"]);

    let seen = fake.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer test-key"));
    assert_eq!(seen[0].body["variables"]["path"], "HW/Workstation-01");
    assert_eq!(seen[0].body["variables"]["locale"], "en");
    assert!(seen[0].body["query"].as_str().unwrap().contains("singleByPath"));
}

#[tokio::test]
async fn test_get_page_not_found_error_is_none() {
    let fake = FakeWiki::replying(200, json!({
        "data": { "pages": { "singleByPath": null } },
        "errors": [{ "message": "This page does not exist.", "extensions": { "exception": { "code": 6003 } } }]
    }));
    let client = client_for(&fake).await;

    let path = PagePath::parse("/nope").unwrap();
    assert!(client.page_by_path(&path, "en").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_page_auth_error_is_unavailable() {
    let fake = FakeWiki::replying(200, json!({
        "data": null,
        "errors": [{ "message": "Forbidden" }]
    }));
    let client = client_for(&fake).await;

    let path = PagePath::parse("/secret").unwrap();
    let err = client.page_by_path(&path, "en").await.unwrap_err();
    assert!(matches!(err, ProxyError::UpstreamUnavailable(_)));
}

#[tokio::test]
async fn test_list_pages_passes_order_and_tolerates_null_list() {
    let fake = FakeWiki::replying(200, json!({ "data": { "pages": { "list": null } } }));
    let client = client_for(&fake).await;

    let pages = client.list_pages(ListOrder::Path).await.unwrap();

    assert!(pages.is_empty());
    assert_eq!(fake.seen()[0].body["variables"]["orderBy"], "PATH");
}

#[tokio::test]
async fn test_create_page_variables_and_conflict() {
    let fake = FakeWiki::replying(200, json!({
        "data": { "pages": { "create": {
            "responseResult": {
                "succeeded": false,
                "errorCode": 6002,
                "slug": "PageDuplicateCreate",
                "message": "Cannot create this page because an entry already exists at the same path."
            },
            "page": null
        }}}
    }));
    let client = client_for(&fake).await;

    let mut page = NewPage::new("/DOC/MyPage", "My Page".into(), "hello".into()).unwrap();
    page.tags = vec!["doc".into()];
    let err = client.create_page(&page, "de").await.unwrap_err();

    assert!(matches!(err, ProxyError::Conflict(_)));
    let vars = &fake.seen()[0].body["variables"];
    assert_eq!(vars["path"], "DOC/MyPage");
    assert_eq!(vars["description"], "My Page");
    assert_eq!(vars["locale"], "de");
    assert_eq!(vars["isPublished"], true);
    assert_eq!(vars["tags"], json!(["doc"]));
}

#[tokio::test]
async fn test_update_page_merges_changes_over_stored_page() {
    let fake = FakeWiki::replying(200, stored_page(json!("old body"))).then(200, json!({
        "data": { "pages": { "update": {
            "responseResult": { "succeeded": true, "errorCode": 0, "slug": "ok", "message": "Page has been updated." },
            "page": { "id": 3, "path": "a", "title": "New", "content": "old body", "description": "d", "isPublished": true }
        }}}
    }));
    let client = client_for(&fake).await;

    let update = PageUpdate::new(3, PageChanges::new(None, Some("New".into()), None).unwrap()).unwrap();
    let page = client.update_page(&update).await.unwrap();

    assert_eq!(page.title, "New");
    assert_eq!(page.content.as_deref(), Some("old body"));

    let seen = fake.seen();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].body["query"].as_str().unwrap().contains("single(id: $id)"));
    assert_eq!(seen[0].body["variables"]["id"], 3);

    // everything the wiki would otherwise blank or unpublish is resent
    let vars = &seen[1].body["variables"];
    assert_eq!(vars["id"], 3);
    assert_eq!(vars["title"], "New");
    assert_eq!(vars["content"], "old body");
    assert_eq!(vars["description"], "d");
    assert_eq!(vars["isPublished"], true);
    assert_eq!(vars["tags"], json!(["x"]));
}

#[tokio::test]
async fn test_update_page_unknown_id_is_not_found_without_writing() {
    let fake = FakeWiki::replying(200, json!({
        "data": { "pages": { "single": null } },
        "errors": [{ "message": "This page does not exist.", "extensions": { "exception": { "code": 6003 } } }]
    }));
    let client = client_for(&fake).await;

    let update = PageUpdate::new(999, PageChanges::new(Some("x".into()), None, None).unwrap()).unwrap();
    let err = client.update_page(&update).await.unwrap_err();

    assert!(matches!(err, ProxyError::NotFound(_)));
    assert_eq!(fake.seen().len(), 1);
}

#[tokio::test]
async fn test_update_page_invalid_page_id_rejection_is_not_found() {
    // page deleted between the read and the write
    let fake = FakeWiki::replying(200, stored_page(json!("body")))
        .then(200, rejected_update(1, "Error", "Invalid Page Id"));
    let client = client_for(&fake).await;

    let update = PageUpdate::new(3, PageChanges::new(Some("x".into()), None, None).unwrap()).unwrap();
    let err = client.update_page(&update).await.unwrap_err();

    assert!(matches!(err, ProxyError::NotFound(_)));
    assert_eq!(fake.seen().len(), 2);
}

#[tokio::test]
async fn test_update_page_with_no_content_anywhere_is_rejected() {
    let fake = FakeWiki::replying(200, stored_page(Value::Null));
    let client = client_for(&fake).await;

    let update = PageUpdate::new(3, PageChanges::new(None, Some("New".into()), None).unwrap()).unwrap();
    let err = client.update_page(&update).await.unwrap_err();

    assert!(matches!(err, ProxyError::Validation(_)));
    assert!(err.to_string().contains("content cannot be empty"));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let fake = FakeWiki::replying(500, json!({ "error": "boom" }));
    let client = client_for(&fake).await;

    let err = client.list_pages(ListOrder::Title).await.unwrap_err();

    assert!(matches!(err, ProxyError::UpstreamUnavailable(_)));
    assert!(err.to_string().contains("500"));
    // exactly one attempt
    assert_eq!(fake.seen().len(), 1);
}

#[tokio::test]
async fn test_slow_wiki_times_out() {
    let mut fake = FakeWiki::replying(200, json!({ "data": { "pages": { "list": [] } } }));
    fake.delay = Duration::from_secs(3);
    let url = spawn_fake_wiki(fake.clone()).await;
    let mut config = test_config(&url);
    config.request_timeout = Duration::from_millis(200);
    let client = WikiJsClient::new(&config).unwrap();

    let err = client.list_pages(ListOrder::Title).await.unwrap_err();

    assert!(matches!(err, ProxyError::UpstreamTimeout(_)));
}

#[tokio::test]
async fn test_unreachable_wiki_is_unavailable() {
    // grab a free port, then close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = WikiJsClient::new(&test_config(&format!("http://{addr}"))).unwrap();

    let err = client.list_pages(ListOrder::Title).await.unwrap_err();

    assert!(matches!(err, ProxyError::UpstreamUnavailable(_)));
}

// the whole chain: router -> service -> client -> fake wiki
#[tokio::test]
async fn test_end_to_end_timeout_maps_to_gateway_timeout() {
    let mut fake = FakeWiki::replying(200, json!({ "data": { "pages": { "singleByPath": null } } }));
    fake.delay = Duration::from_secs(3);
    let url = spawn_fake_wiki(fake.clone()).await;
    let mut config = test_config(&url);
    config.request_timeout = Duration::from_millis(200);
    let client = WikiJsClient::new(&config).unwrap();
    let service = PageService::new(Arc::new(client), &config);
    let app = build_app(AppState {
        service: Arc::new(service),
        config: Arc::new(config),
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get_page")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"path": "/slow"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "upstream_timeout");
}

#[tokio::test]
async fn test_end_to_end_missing_page_is_not_found() {
    let fake = FakeWiki::replying(200, json!({ "data": { "pages": { "singleByPath": null } } }));
    let url = spawn_fake_wiki(fake.clone()).await;
    let config = test_config(&url);
    let service = PageService::new(Arc::new(WikiJsClient::new(&config).unwrap()), &config);
    let app = build_app(AppState {
        service: Arc::new(service),
        config: Arc::new(config),
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/get_page")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"path": "/missing", "locale": "de"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fake.seen()[0].body["variables"]["locale"], "de");
}
