//! Session-expiry behaviour of the response interceptor

use async_trait::async_trait;
use oak_http::client::auth::LoginRequest;
use oak_http::{
    ApiClient, ClientError, ExpiryFlow, MemoryTokenStore, Navigator, Notifier, SessionExpired,
    SessionExpiryHandler, TokenStore,
};
use reqwest::Method;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records each event together with whether a token was still stored
#[derive(Default)]
struct Recorder {
    store: Mutex<Option<Arc<MemoryTokenStore>>>,
    events: Mutex<Vec<(SessionExpired, bool)>>,
}

impl Recorder {
    fn events(&self) -> Vec<(SessionExpired, bool)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionExpiryHandler for Recorder {
    async fn on_session_expired(&self, event: &SessionExpired) {
        let token_present = self
            .store
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|store| store.is_present());
        self.events
            .lock()
            .unwrap()
            .push((event.clone(), token_present));
    }
}

fn setup(server: &MockServer, token: &str) -> (ApiClient, Arc<MemoryTokenStore>, Arc<Recorder>) {
    let store = Arc::new(MemoryTokenStore::with_token(token));
    let recorder = Arc::new(Recorder::default());
    *recorder.store.lock().unwrap() = Some(store.clone());

    let client = ApiClient::builder()
        .base_url(server.uri())
        .shared_token_store(store.clone())
        .shared_expiry_handler(recorder.clone())
        .build()
        .unwrap();
    (client, store, recorder)
}

#[tokio::test]
async fn forbidden_on_protected_route_expires_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/produtos"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "expired");

    let err = client.list_products().await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(store.get().is_none());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    let (event, token_present) = &events[0];
    assert!(!token_present, "store must be cleared before the handler runs");
    assert_eq!(event.method, Method::GET);
    assert_eq!(event.path, "/api/produtos");
    assert_eq!(event.status, 403);
    assert_eq!(event.redirect_to, "/");
}

#[tokio::test]
async fn unauthorized_on_protected_route_expires_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/categorias/5"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token inválido" })))
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "expired");

    let err = client.delete_category(5).await.unwrap_err();
    assert!(matches!(err, ClientError::AuthenticationFailed(_)));
    assert!(store.get().is_none());

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0.message, "Token inválido");
    assert_eq!(events[0].0.method, Method::DELETE);
}

#[tokio::test]
async fn failed_login_does_not_touch_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Credenciais inválidas" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "still-here");

    let err = client
        .login(&LoginRequest {
            email: "ana@oak.dev".to_string(),
            password: "errada".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Credenciais inválidas"));
    assert_eq!(store.get().as_deref(), Some("still-here"));
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn forbidden_registration_does_not_touch_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "still-here");

    let err = client
        .post::<_, serde_json::Value>("/api/auth/register", &json!({ "email": "x" }))
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(store.get().as_deref(), Some("still-here"));
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn lookalike_prefix_is_a_protected_route() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/authors"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "t");

    let err = client
        .get::<serde_json::Value>("/api/authors")
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert!(store.get().is_none());
    assert_eq!(recorder.events().len(), 1);
}

#[tokio::test]
async fn other_failures_have_no_session_side_effects() {
    let mock_server = MockServer::start().await;

    for (route, status) in [("/api/produtos", 500), ("/api/categorias", 404), ("/api/movimentacoes", 409)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&mock_server)
            .await;
    }

    let (client, store, recorder) = setup(&mock_server, "abc123");

    assert!(client.list_products().await.is_err());
    assert!(client.list_categories().await.is_err());
    assert!(client.list_movements().await.is_err());

    assert_eq!(store.get().as_deref(), Some("abc123"));
    assert!(recorder.events().is_empty());
}

#[tokio::test]
async fn concurrent_failures_each_emit_an_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let (client, store, recorder) = setup(&mock_server, "expired");

    let (products, categories) = tokio::join!(client.list_products(), client.list_categories());
    assert!(products.unwrap_err().is_auth_failure());
    assert!(categories.unwrap_err().is_auth_failure());

    assert!(store.get().is_none());
    let mut paths: Vec<String> = recorder.events().into_iter().map(|(e, _)| e.path).collect();
    paths.sort();
    assert_eq!(paths, ["/api/categorias", "/api/produtos"]);
}

#[derive(Clone, Default)]
struct Timeline(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl Notifier for Timeline {
    async fn notify(&self, title: &str, _text: &str) {
        tokio::task::yield_now().await;
        self.0.lock().unwrap().push(format!("notify:{title}"));
    }
}

impl Navigator for Timeline {
    fn navigate(&self, route: &str) {
        self.0.lock().unwrap().push(format!("navigate:{route}"));
    }
}

#[tokio::test]
async fn expiry_flow_notifies_then_redirects_before_error_returns() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/relatorios/lista-de-precos"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let timeline = Timeline::default();
    let client = ApiClient::builder()
        .base_url(mock_server.uri())
        .token_store(MemoryTokenStore::with_token("expired"))
        .on_session_expired(ExpiryFlow::new(timeline.clone(), timeline.clone()))
        .build()
        .unwrap();

    let err = client.price_list().await.unwrap_err();
    timeline.0.lock().unwrap().push("caller".to_string());

    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(!client.is_logged_in());
    assert_eq!(
        *timeline.0.lock().unwrap(),
        ["notify:Session expired", "navigate:/", "caller"]
    );
}
