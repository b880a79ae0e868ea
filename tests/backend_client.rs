use std::time::Duration;

use gh_repo_finder::{BackendClient, RepositoryFetcher, Session};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alice_record() -> serde_json::Value {
    json!({
        "username": "alice",
        "userInformation": {
            "avatarUrl": "https://avatars.example/alice",
            "name": "Alice",
            "location": null
        },
        "repositoryInformation": [
            {"repoName": "one", "repoHtmlUrl": "https://github.com/alice/one", "repoDescription": null}
        ]
    })
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn batches_usernames_into_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .and(query_param("users", "alice,bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alice_record()])))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .fetch(&["alice".to_string(), "bob".to_string()])
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].username, "alice");
    assert_eq!(results[0].repositories[0].name, "one");
}

#[tokio::test]
async fn empty_request_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let results = client(&server).fetch(&[]).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn server_error_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).fetch(&["alice".to_string()]).await.unwrap_err();
    assert_eq!(err.message(), "Backend returned HTTP 500: database unavailable");
}

#[tokio::test]
async fn malformed_payload_is_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
        .mount(&server)
        .await;

    let err = client(&server).fetch(&["alice".to_string()]).await.unwrap_err();
    assert!(err.message().starts_with("Malformed response"));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = BackendClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
    let mut session = Session::new();
    session.registry_mut().add("alice");
    session.submit(&client).await;

    assert_eq!(
        session.error_message(),
        Some("Uh oh! Unable to retrieve the data for the following reason: Network timeout")
    );
}

#[tokio::test]
async fn single_user_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": alice_record()})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
        .mount(&server)
        .await;

    let client = client(&server);
    let alice = client.fetch_one("alice").await.unwrap().unwrap();
    assert_eq!(alice.profile.display_name.as_deref(), Some("Alice"));
    assert!(client.fetch_one("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn username_is_a_single_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": alice_record()})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/alice%23x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/alice%3Fadmin=1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(client.fetch_one("alice#x").await.unwrap().is_none());
    assert!(client.fetch_one("alice?admin=1").await.unwrap().is_none());
}

#[test]
fn trailing_slash_is_trimmed() {
    let client = BackendClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:5000");
}
