use std::sync::Arc;

use habitica_api::{ConfigUpdate, Connection, Error, RequestOptions};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn connect(server: &MockServer) -> Connection {
    Connection::new(
        ConfigUpdate::new()
            .credentials("myUuid", "myToken")
            .endpoint(format!("{}/", server.uri())),
    )
    .unwrap()
}

async fn last_request(server: &MockServer) -> wiremock::Request {
    server
        .received_requests()
        .await
        .unwrap()
        .pop()
        .expect("no request received")
}

#[tokio::test]
async fn get_versioned_route_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"some": "data"})))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server);
    let body: Value = conn.get("/user", None).await.unwrap();
    assert_eq!(body, json!({"some": "data"}));
}

#[tokio::test]
async fn top_level_route_skips_version_prefix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server);
    let body: Value = conn.get("/logout", None).await.unwrap();
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn sends_client_and_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .and(header("accept", "application/json"))
        .and(header("x-client", "test-platform"))
        .and(header("x-api-user", "myUuid"))
        .and(header("x-api-key", "myToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server);
    conn.configure(ConfigUpdate::new().platform("test-platform"));
    let _: Value = conn.get("/user", None).await.unwrap();
}

#[tokio::test]
async fn auth_headers_omitted_unless_both_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let conn = connect(&server);
    for update in [
        ConfigUpdate::new().clear_api_key(),
        ConfigUpdate::new().api_key("myToken").clear_id(),
        ConfigUpdate::new().clear_id().clear_api_key(),
    ] {
        conn.configure(update);
        let _: Value = conn.get("/content", None).await.unwrap();

        let req = last_request(&server).await;
        assert!(!req.headers.contains_key("x-api-user"));
        assert!(!req.headers.contains_key("x-api-key"));
        assert!(req.headers.contains_key("x-client"));
    }
}

#[tokio::test]
async fn query_and_body_are_sent_for_every_verb() {
    let server = MockServer::start().await;

    for verb in ["GET", "POST", "PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(path("/api/v3/user/tasks"))
            .and(query_param("type", "habit"))
            .and(query_param("text", "test habit"))
            .and(body_json(json!({"type": "party"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"verb": verb})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let conn = connect(&server);
    let options = || {
        Some(
            RequestOptions::new()
                .with_query("type", "habit")
                .with_query("text", "test habit")
                .with_body(json!({"type": "party"})),
        )
    };

    let got: Value = conn.get("/user/tasks", options()).await.unwrap();
    assert_eq!(got["verb"], "GET");
    let got: Value = conn.post("/user/tasks", options()).await.unwrap();
    assert_eq!(got["verb"], "POST");
    let got: Value = conn.put("/user/tasks", options()).await.unwrap();
    assert_eq!(got["verb"], "PUT");
    let got: Value = conn.delete("/user/tasks", options()).await.unwrap();
    assert_eq!(got["verb"], "DELETE");
}

#[tokio::test]
async fn missing_options_send_no_query_or_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/cron"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server);
    let body: Value = conn.post("/cron", None).await.unwrap();
    assert_eq!(body, Value::Null);

    let req = last_request(&server).await;
    assert_eq!(req.url.query(), None);
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn unauthorized_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "NotAuthorized",
            "message": "Missing credentials"
        })))
        .mount(&server)
        .await;

    let conn = connect(&server);
    let err = conn.get::<Value>("/user", None).await.unwrap_err();

    match err {
        Error::Api(api) => {
            assert_eq!(api.status, 401);
            assert_eq!(api.error_type.as_deref(), Some("NotAuthorized"));
            assert_eq!(api.message.as_deref(), Some("Missing credentials"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn not_found_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/tasks/abc"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "NotFound",
            "message": "Task not found."
        })))
        .mount(&server)
        .await;

    let conn = connect(&server);
    let err = conn.delete::<Value>("/tasks/abc", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.error_type(), Some("NotFound"));
}

#[tokio::test]
async fn non_json_error_body_is_unknown_connection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let conn = connect(&server);
    let err = conn.get::<Value>("/user", None).await.unwrap_err();
    assert!(err.is_unknown_connection());
}

#[tokio::test]
async fn malformed_success_body_is_unknown_connection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&server)
        .await;

    let conn = connect(&server);
    let err = conn.get::<Value>("/user", None).await.unwrap_err();
    assert!(err.is_unknown_connection());
}

#[tokio::test]
async fn network_failure_is_unknown_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let conn = Connection::new(ConfigUpdate::new().credentials("a", "b").endpoint(uri)).unwrap();
    let err = conn.post::<Value>("/user/tasks", None).await.unwrap_err();

    assert!(err.is_unknown_connection());
    assert!(!err.is_api());
    assert_eq!(err.to_string(), habitica_api::UNKNOWN_CONNECTION_MESSAGE);
    assert!(std::error::Error::source(&err).is_some());
}

#[derive(Debug, thiserror::Error)]
#[error("wrapped: {0}")]
struct Wrapped(String);

#[tokio::test]
async fn error_handler_transforms_failures() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "NotAuthorized",
            "message": "Missing credentials"
        })))
        .mount(&server)
        .await;

    let conn = connect(&server);
    conn.configure(ConfigUpdate::new().error_handler(|err| {
        Error::handled(Wrapped(format!("{:?}", err.error_type())))
    }));

    let err = conn.get::<Value>("/user", None).await.unwrap_err();
    assert!(matches!(err, Error::Handled(_)));
    assert_eq!(err.to_string(), "wrapped: Some(\"NotAuthorized\")");

    conn.configure(ConfigUpdate::new().clear_error_handler());
    let err = conn.get::<Value>("/user", None).await.unwrap_err();
    assert!(err.is_api());
}

#[tokio::test]
async fn error_handler_sees_transport_failures() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let conn = Connection::new(
        ConfigUpdate::new()
            .endpoint(uri)
            .error_handler(|err| {
                Error::handled(Wrapped(format!("unknown={}", err.is_unknown_connection())))
            }),
    )
    .unwrap();

    let err = conn.post::<Value>("/user/tasks", None).await.unwrap_err();
    assert!(matches!(err, Error::Handled(_)));
    assert_eq!(err.to_string(), "wrapped: unknown=true");
}

#[tokio::test]
async fn configuration_changes_apply_to_later_calls() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let conn = Arc::new(connect(&server));
    let (a, b) = tokio::join!(
        conn.get::<Value>("/user", None),
        conn.get::<Value>("/export/history.csv", None)
    );
    assert!(a.is_ok());
    assert!(b.is_ok());

    conn.configure(ConfigUpdate::new().id("otherUuid"));
    let _: Value = conn.get("/user", None).await.unwrap();
    let req = last_request(&server).await;
    assert_eq!(req.headers.get("x-api-user").unwrap(), "otherUuid");
    assert_eq!(req.url.path(), "/api/v3/user");
}
