//! HTTP behavior of the OpenAI-compatible completion client.
//!
//! Uses a local mockito server in place of the completion endpoint.

use mockito::Matcher;
use nlquery_core::{
    CompletionClient, CompletionConfig, CompletionRequest, NlQueryError, OpenAiCompletionClient,
    Result,
};
use serde_json::json;

const ENDPOINT: &str = "/v1/chat/completions";

fn client_for(server: &mockito::ServerGuard) -> OpenAiCompletionClient {
    OpenAiCompletionClient::new(
        CompletionConfig::new("sk-test")
            .with_base_url(server.url())
            .with_model("gpt-4o"),
    )
    .unwrap()
}

fn reply_with(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

// ===== Request shape =====

#[tokio::test]
async fn test_structured_request_sends_json_mode_and_both_turns() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT)
        .match_header("authorization", "Bearer sk-test")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "model": "gpt-4o",
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": "translate"},
                {"role": "user", "content": "how many plants?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_with(r#"{"sql_query": "SELECT 1"}"#))
        .create_async()
        .await;

    let reply = client_for(&server)
        .complete(
            CompletionRequest::system("translate")
                .with_user_message("how many plants?")
                .with_structured_output(),
        )
        .await?;

    assert_eq!(reply, r#"{"sql_query": "SELECT 1"}"#);
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_plain_request_omits_response_format() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT)
        .match_body(Matcher::Json(json!({
            "model": "gpt-4o",
            "messages": [{"role": "system", "content": "compose"}]
        })))
        .with_status(200)
        .with_body(reply_with("There are 3 plants."))
        .create_async()
        .await;

    let reply = client_for(&server)
        .complete(CompletionRequest::system("compose"))
        .await?;

    assert_eq!(reply, "There are 3 plants.");
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_trailing_slash_in_base_url_is_tolerated() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body(reply_with("ok"))
        .create_async()
        .await;

    let client = OpenAiCompletionClient::new(
        CompletionConfig::new("sk-test").with_base_url(format!("{}/", server.url())),
    )?;
    client.complete(CompletionRequest::system("ping")).await?;

    mock.assert_async().await;
    Ok(())
}

// ===== Failures =====

#[tokio::test]
async fn test_error_status_is_completion_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(500)
        .with_body(r#"{"error": {"message": "overloaded"}}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .complete(CompletionRequest::system("compose"))
        .await;

    match result {
        Err(e @ NlQueryError::Completion { .. }) => {
            assert!(e.to_string().contains("500"));
            assert_eq!(e.public_message(), "problem with the completion service");
        }
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_content_is_completion_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .complete(CompletionRequest::system("compose"))
        .await;
    assert!(matches!(result, Err(NlQueryError::Completion { .. })));
}

#[tokio::test]
async fn test_empty_choices_is_completion_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let result = client_for(&server)
        .complete(CompletionRequest::system("compose"))
        .await;
    assert!(matches!(result, Err(NlQueryError::Completion { .. })));
}

#[tokio::test]
async fn test_malformed_body_is_completion_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let result = client_for(&server)
        .complete(CompletionRequest::system("compose"))
        .await;
    assert!(matches!(result, Err(NlQueryError::Completion { .. })));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_completion_failure() {
    let client = OpenAiCompletionClient::new(
        CompletionConfig::new("sk-test").with_base_url("http://127.0.0.1:1"),
    )
    .unwrap();

    let result = client.complete(CompletionRequest::system("compose")).await;
    assert!(matches!(result, Err(NlQueryError::Completion { .. })));
}

// ===== Configuration =====

#[test]
fn test_invalid_configuration_is_rejected() {
    assert!(matches!(
        OpenAiCompletionClient::new(CompletionConfig::new("  ")),
        Err(NlQueryError::Configuration { .. })
    ));
    assert!(matches!(
        OpenAiCompletionClient::new(CompletionConfig::new("sk-test").with_base_url("ftp://host")),
        Err(NlQueryError::Configuration { .. })
    ));
}

#[test]
fn test_debug_never_shows_api_key() {
    let client = OpenAiCompletionClient::new(CompletionConfig::new("sk-very-secret")).unwrap();
    assert!(!format!("{client:?}").contains("sk-very-secret"));
    assert_eq!(client.model_name(), "gpt-4o");
}
