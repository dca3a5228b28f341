//! Integration tests for the single-flight refresh coordinator

#![cfg(feature = "client")]

use portal_core::{CredentialPair, CredentialStore, MemoryCredentialStore};
use portal_core::logging::init_test_tracing;
use portal_http::{ApiClient, RefreshDenied};
use serde_json::json;
use std::net::TcpListener;
use std::rc::Rc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup(server: &MockServer, pair: Option<CredentialPair>) -> (ApiClient, Rc<MemoryCredentialStore>) {
    setup_at(server.uri(), pair)
}

fn setup_at(base_url: String, pair: Option<CredentialPair>) -> (ApiClient, Rc<MemoryCredentialStore>) {
    init_test_tracing();
    let store = Rc::new(match pair {
        Some(pair) => MemoryCredentialStore::with_pair(pair),
        None => MemoryCredentialStore::new(),
    });
    let shared: Rc<dyn CredentialStore> = store.clone();
    let client = ApiClient::builder()
        .base_url(base_url)
        .credential_store(shared)
        .build()
        .unwrap();
    (client, store)
}

#[tokio::test]
async fn test_refresh_without_credential_is_denied_locally() {
    let server = MockServer::start().await;
    Mock::given(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = setup(&server, None);
    let outcome = client.refresher().refresh().await;
    assert_eq!(outcome, Err(RefreshDenied::MissingCredential));
    assert!(!client.refresher().is_refreshing());
}

#[tokio::test]
async fn test_refresh_keeps_refresh_credential_when_not_rotated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    let pair = client.refresher().refresh().await.unwrap();

    assert_eq!(pair.access_token, "access-2");
    assert_eq!(pair.refresh_token, "refresh-1");
    assert_eq!(store.get(), Some(pair));
}

#[tokio::test]
async fn test_rejected_refresh_clears_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    let outcome = client.refresher().refresh().await;

    assert_eq!(outcome, Err(RefreshDenied::Rejected { status: 401 }));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_malformed_refresh_response_clears_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "nope"})))
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    let outcome = client.refresher().refresh().await;

    assert!(matches!(outcome, Err(RefreshDenied::InvalidResponse(_))));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_concurrent_refresh_calls_share_one_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "access-2", "refresh": "refresh-2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    let refresher = client.refresher();

    let observe = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        refresher.is_refreshing()
    };
    let (first, second, third, was_refreshing) = tokio::join!(
        refresher.refresh(),
        refresher.refresh(),
        refresher.refresh(),
        observe
    );

    assert!(was_refreshing);
    assert!(!refresher.is_refreshing());
    let first = first.unwrap();
    assert_eq!(first.access_token, "access-2");
    assert_eq!(second.unwrap(), first);
    assert_eq!(third.unwrap(), first);
}

#[tokio::test]
async fn test_sequential_refreshes_each_reach_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "access-n"})))
        .expect(2)
        .mount(&server)
        .await;

    let (client, _store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    client.refresher().refresh().await.unwrap();
    client.refresher().refresh().await.unwrap();
}

#[tokio::test]
async fn test_logout_during_refresh_discards_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "access-2", "refresh": "refresh-2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));

    let logout = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.clear();
    };
    let (outcome, ()) = tokio::join!(client.refresher().refresh(), logout);

    assert_eq!(outcome, Err(RefreshDenied::Superseded));
    assert_eq!(store.get(), None);
}

#[tokio::test]
async fn test_new_login_during_failed_refresh_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-1", "refresh-1")));
    let replacement = CredentialPair::new("access-b", "refresh-b");

    let login = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.set(&replacement);
    };
    let (outcome, ()) = tokio::join!(client.refresher().refresh(), login);

    assert_eq!(outcome, Err(RefreshDenied::Rejected { status: 401 }));
    assert_eq!(store.get(), Some(replacement));
}

#[tokio::test]
async fn test_rejected_access_already_renewed_skips_exchange() {
    let server = MockServer::start().await;
    Mock::given(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = setup(&server, Some(CredentialPair::new("access-2", "refresh-2")));
    let generation = client.credentials().generation();
    let pair = client
        .refresher()
        .refresh_rejected("access-1", generation)
        .await
        .unwrap();
    assert_eq!(pair.access_token, "access-2");
}

#[tokio::test]
async fn test_rejected_access_from_previous_session_is_superseded() {
    let server = MockServer::start().await;
    Mock::given(path("/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, store) = setup(&server, Some(CredentialPair::new("access-a", "refresh-a")));
    let generation = store.generation();
    store.clear();
    store.set(&CredentialPair::new("access-b", "refresh-b"));

    let outcome = client
        .refresher()
        .refresh_rejected("access-a", generation)
        .await;

    assert_eq!(outcome, Err(RefreshDenied::Superseded));
    assert_eq!(store.get().unwrap().access_token, "access-b");
}

#[tokio::test]
async fn test_refresh_transport_failure_clears_store() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let (client, store) = setup_at(
        format!("http://127.0.0.1:{port}"),
        Some(CredentialPair::new("access-1", "refresh-1")),
    );
    let outcome = client.refresher().refresh().await;

    assert!(matches!(outcome, Err(RefreshDenied::Transport(_))));
    assert_eq!(store.get(), None);
    assert!(!client.refresher().is_refreshing());
}
