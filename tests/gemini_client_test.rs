use medichat::{Config, GeminiClient, GenerateRequest, ImageAttachment, ModelService, SubmissionError};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    let config = Config::new(
        Some("test-key".to_string()),
        Some("test-model".to_string()),
        Some(server.uri()),
    )
    .unwrap();
    GeminiClient::new(config)
}

fn reply_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[test_log::test(tokio::test)]
async fn test_generate_sends_key_and_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(|req: &Request| {
            let body: Value = match serde_json::from_slice(&req.body) {
                Ok(body) => body,
                Err(_) => return false,
            };
            let parts = &body["contents"][0]["parts"];
            body["contents"][0]["role"] == "user"
                && parts[0]["text"] == "describe this"
                && parts[1]["inlineData"]["mimeType"] == "image/png"
                && parts[1]["inlineData"]["data"] == "aGVsbG8="
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("A small bruise.")))
        .expect(1)
        .mount(&server)
        .await;

    let image = ImageAttachment::new("bruise.png", "image/png", b"hello".to_vec()).unwrap();
    let request = GenerateRequest::new("describe this".to_string(), &[image]);

    let reply = client_for(&server).generate(&request).await.unwrap();
    assert_eq!(reply, "A small bruise.");
}

#[tokio::test]
async fn test_key_not_sent_in_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("hi".to_string(), &[]);
    client_for(&server).generate(&request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].url.query().is_none());
}

#[tokio::test]
async fn test_service_error_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("hi".to_string(), &[]);
    let err = client_for(&server).generate(&request).await.unwrap_err();

    match err {
        SubmissionError::Service { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "INVALID_ARGUMENT: API key not valid.");
        }
        other => panic!("expected Service error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("hi".to_string(), &[]);
    let err = client_for(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, SubmissionError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_blocked_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("hi".to_string(), &[]);
    let err = client_for(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Blocked(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn test_candidate_without_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let request = GenerateRequest::new("hi".to_string(), &[]);
    let err = client_for(&server).generate(&request).await.unwrap_err();
    assert!(matches!(err, SubmissionError::EmptyReply));
}

#[tokio::test]
async fn test_unreachable_service() {
    // Nothing listens on port 1
    let config = Config::new(
        Some("test-key".to_string()),
        Some("test-model".to_string()),
        Some("http://127.0.0.1:1".to_string()),
    )
    .unwrap();
    let request = GenerateRequest::new("hi".to_string(), &[]);

    let err = GeminiClient::new(config).generate(&request).await.unwrap_err();
    assert!(matches!(err, SubmissionError::Transport(_)));
}
