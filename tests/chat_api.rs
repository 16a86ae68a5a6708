use agent_client::app::ClientConfig;
use agent_client::chat::ChatApi;
use agent_client::Error;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ChatApi {
    let config = ClientConfig::default().with_base_url(server.uri());
    ChatApi::from_config(&config).unwrap()
}

#[tokio::test]
async fn send_posts_message_and_returns_body_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"message": "hello", "conversation_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hi"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server).send("hello", None).await.unwrap();
    assert_eq!(reply, json!({"reply": "hi"}));
}

#[tokio::test]
async fn send_carries_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .and(body_json(json!({"message": "and then?", "conversation_id": "conv-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "Then lunch.", "conversation_id": "conv-1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .send("and then?", Some("conv-1"))
        .await
        .unwrap();
    assert_eq!(reply["conversation_id"], "conv-1");
}

#[tokio::test]
async fn get_history_issues_single_get_without_body() {
    let server = MockServer::start().await;
    let history = json!({
        "conversation_id": "conv-1",
        "messages": [{"role": "user", "content": "hello", "timestamp": 1700000000.0}]
    });
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/conv-1/history"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let result = api_for(&server).get_history("conv-1").await.unwrap();
    assert_eq!(result, history);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn server_errors_surface_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "boom"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/conv-1/history"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);

    let err = api.send("hello", None).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

    let err = api.get_history("conv-1").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/missing/history"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server).get_history("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"reply": "late"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/conv-1/history"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let api = ChatApi::from_config(&config).unwrap();

    let err = api.send("hello", None).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(err.status().is_none());

    let err = api.get_history("conv-1").await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::default().with_base_url(format!("http://{}", addr));
    let api = ChatApi::from_config(&config).unwrap();

    let err = api.send("hello", None).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(err.status().is_none());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/conv-2/history"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = api_for(&server).get_history("conv-2").await.unwrap();
    assert!(result.is_null());
}

#[tokio::test]
async fn non_json_success_body_is_returned_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain ok"))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server).send("hello", None).await.unwrap();
    assert_eq!(reply, json!("plain ok"));
}

#[tokio::test]
async fn conversation_id_stays_in_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/a%2Fb%3Fx=1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result = api_for(&server).get_history("a/b?x=1").await.unwrap();
    assert_eq!(result, json!({"messages": []}));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().is_none());
}
