/// End-to-end tests driving the HTTP router with an in-memory store
use adressen_meister::{
    clock::SystemClock,
    config::{
        AuthConfig, LoggingConfig, RateLimitSettings, ServerConfig, ServiceConfig, StorageConfig,
    },
    error::DirectoryResult,
    mailer::MailTransport,
    server::build_router,
    store::{ContactStore, ExtentStore},
    AppContext,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "integration-admin-token-0123456789";

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Secret from the link in the last mail to `to`
    fn last_secret_for(&self, to: &str) -> String {
        let sent = self.sent();
        let (_, body) = sent.iter().rev().find(|(recipient, _)| recipient == to).unwrap();
        let link = body
            .split_whitespace()
            .find(|word| word.contains("/UserLogin/"))
            .unwrap();
        link.rsplit('/').next().unwrap().to_string()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> DirectoryResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

fn config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 8080,
            public_url: "http://adressen.test".to_string(),
        },
        storage: StorageConfig {
            data_directory: PathBuf::from("./data"),
            directory_db: PathBuf::from(":memory:"),
        },
        authentication: AuthConfig {
            admin_token: ADMIN_TOKEN.to_string(),
        },
        email: None,
        rate_limit: RateLimitSettings {
            enabled: false,
            public_rps: 10,
            admin_rps: 100,
            burst_size: 20,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            json: false,
        },
    }
}

struct TestApp {
    router: Router,
    store: Arc<ExtentStore>,
    transport: Arc<RecordingTransport>,
}

fn test_app() -> TestApp {
    test_app_with(config())
}

fn test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(ExtentStore::in_memory());
    let transport = Arc::new(RecordingTransport::default());
    let ctx = AppContext::with_parts(
        config,
        store.clone(),
        transport.clone(),
        Arc::new(SystemClock),
    );

    TestApp {
        router: build_router(ctx),
        store,
        transport,
    }
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, admin: bool, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if admin {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    async fn add_contacts(&self, emails: &str) -> Value {
        let (status, body) = self
            .call(
                Method::POST,
                "/admin/contacts",
                true,
                Some(json!({ "emails": emails })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, body) = app.call(Method::GET, "/health", false, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app();
    let (status, body) = app.call(Method::GET, "/nowhere", false, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_rate_limit_covers_unknown_routes() {
    let mut config = config();
    config.rate_limit = RateLimitSettings {
        enabled: true,
        public_rps: 1,
        admin_rps: 1,
        burst_size: 1,
    };
    let app = test_app_with(config);

    let (status, _) = app.call(Method::GET, "/nowhere", false, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.call(Method::GET, "/nowhere", false, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RateLimitExceeded");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = test_app();

    let (status, _) = app.call(Method::GET, "/admin/contacts", false, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/admin/contacts")
        .header(header::AUTHORIZATION, "Bearer wrong-token")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/admin/contacts", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_admin_adds_and_lists_contacts_without_secrets() {
    let app = test_app();

    let added = app.add_contacts("a@x.com; b@x.com;nope").await;
    assert_eq!(added.as_array().unwrap().len(), 2);

    // Known addresses come back as they are
    let again = app.add_contacts("a@x.com").await;
    assert_eq!(again[0]["id"], added[0]["id"]);

    let (status, body) = app.call(Method::GET, "/admin/contacts", true, None).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0]["email"], "a@x.com");
    assert_eq!(contacts[1]["email"], "b@x.com");
    assert!(contacts.iter().all(|c| c.get("secret").is_none()));

    let (status, body) = app.call(Method::GET, "/admin/contacts/b@x.com", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "b@x.com");

    let (status, _) = app.call(Method::GET, "/admin/contacts/c@x.com", true, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_creates_contact_with_data() {
    let app = test_app();

    let (status, body) = app
        .call(
            Method::POST,
            "/admin/new-contact",
            true,
            Some(json!({ "email": "m@x.com", "name": "Brenn", "is_name_visible": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Brenn");

    let (status, _) = app
        .call(Method::POST, "/admin/new-contact", true, Some(json!({ "email": "invalid" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, directory) = app.call(Method::GET, "/directory", false, None).await;
    assert_eq!(directory[0]["name"], "Brenn");
}

#[tokio::test]
async fn test_admin_deletes_contact() {
    let app = test_app();
    app.add_contacts("a@x.com;b@x.com").await;

    let (status, body) = app.call(Method::DELETE, "/admin/contacts/a@x.com", true, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (_, body) = app.call(Method::DELETE, "/admin/contacts/a@x.com", true, None).await;
    assert_eq!(body["deleted"], false);

    let remaining = app.store.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].email, "b@x.com");
}

#[tokio::test]
async fn test_invitation_login_and_update_flow() {
    let app = test_app();
    app.add_contacts("brenn@depon.net").await;

    let (status, report) = app
        .call(
            Method::POST,
            "/admin/invitations",
            true,
            Some(json!({ "emails": ["brenn@depon.net", "unknown@depon.net"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["result"], "EmailNotKnown");
    assert_eq!(report["outcomes"][0]["result"], "Success");
    assert_eq!(report["outcomes"][1]["result"], "EmailNotKnown");
    assert_eq!(app.transport.sent().len(), 1);

    let secret = app.transport.last_secret_for("brenn@depon.net");
    assert_eq!(secret.len(), 32);

    let (status, body) = app
        .call(
            Method::POST,
            "/login/validate",
            false,
            Some(json!({ "email": "brenn@depon.net", "secret": secret })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Success");

    let (_, body) = app
        .call(
            Method::GET,
            &format!("/UserLogin/brenn%40depon.net/{}", secret),
            false,
            None,
        )
        .await;
    assert_eq!(body["result"], "Success");

    let (_, body) = app
        .call(
            Method::POST,
            "/login/validate",
            false,
            Some(json!({ "email": "brenn@depon.net", "secret": "not-the-secret" })),
        )
        .await;
    assert_eq!(body["result"], "Wrong");

    let (status, body) = app
        .call(
            Method::POST,
            "/user/update",
            false,
            Some(json!({
                "email": "brenn@depon.net",
                "secret": secret,
                "data": {
                    "name": "Brenn",
                    "prename": "Martin",
                    "city": "Mainz",
                    "phone": "0123",
                    "is_name_visible": true,
                    "is_address_visible": true
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], true);

    let (status, directory) = app.call(Method::GET, "/directory", false, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = directory.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Brenn");
    assert_eq!(entries[0]["city"], "Mainz");
    assert_eq!(entries[0]["phone"], "");
    assert_eq!(entries[0]["email"], "");
}

#[tokio::test]
async fn test_update_rejects_wrong_secret() {
    let app = test_app();
    app.add_contacts("brenn@depon.net").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/user/update",
            false,
            Some(json!({
                "email": "brenn@depon.net",
                "secret": "guess",
                "data": { "name": "Mallory", "is_name_visible": true }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "AuthenticationRequired");

    let stored = app.store.find_by_email("brenn@depon.net").await.unwrap().unwrap();
    assert!(stored.name.is_empty());
}

#[tokio::test]
async fn test_login_request_is_throttled() {
    let app = test_app();
    app.add_contacts("brenn@depon.net").await;

    let request = json!({ "email": "brenn@depon.net" });
    let (status, body) = app
        .call(Method::POST, "/login/request", false, Some(request.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Success");

    let (_, body) = app
        .call(Method::POST, "/login/request", false, Some(request))
        .await;
    assert_eq!(body["result"], "AlreadySent");
    assert_eq!(app.transport.sent().len(), 1);

    let (_, body) = app
        .call(
            Method::POST,
            "/login/request",
            false,
            Some(json!({ "email": "unknown@depon.net" })),
        )
        .await;
    assert_eq!(body["result"], "EmailNotKnown");
}
