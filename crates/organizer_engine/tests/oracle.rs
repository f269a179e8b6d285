use std::time::Duration;

use organizer_core::{FeedMetadata, FeedReference, PodcastRecord};
use organizer_engine::oracle::{AnthropicOracle, OpenAiOracle};
use organizer_engine::{create_oracle, ConfigError, Oracle, OracleError, OracleSettings, ProviderKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record(title: &str) -> PodcastRecord {
    PodcastRecord::fetched(
        &FeedReference::new(title, format!("https://feeds.test/{title}")),
        FeedMetadata {
            title: title.to_string(),
            description: Some(format!("All about {title}")),
            ..FeedMetadata::default()
        },
    )
}

fn anthropic_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }]
    }))
}

fn openai_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    }))
}

fn anthropic(server: &MockServer) -> AnthropicOracle {
    AnthropicOracle::new("test-key", None, Duration::from_secs(5))
        .expect("client")
        .with_base_url(&server.uri())
}

fn openai(server: &MockServer) -> OpenAiOracle {
    OpenAiOracle::new("test-key", Some("gpt-test".into()), Duration::from_secs(5))
        .expect("client")
        .with_base_url(&server.uri())
}

#[tokio::test]
async fn anthropic_sends_headers_and_strips_fenced_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "model": "claude-3-5-sonnet-20241022" })))
        .respond_with(anthropic_text(
            "```json\n{\"categories\": {\"Science\": [1], \"Technology\": [0]}}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = anthropic(&server);
    let categorization = oracle
        .categorize(&[record("Vergecast"), record("Radiolab")])
        .await
        .expect("categorized");

    assert_eq!(oracle.name(), "claude");
    assert_eq!(categorization.categories["Technology"], vec![0]);
    assert_eq!(categorization.categories["Science"], vec![1]);
}

#[tokio::test]
async fn openai_uses_bearer_auth_and_json_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(openai_text(
            "{\"tags\": {\"0\": [\"tech\", \"news\"]}, \"descriptions\": {\"0\": \"Tech news.\"}}",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let oracle = openai(&server);
    let batch = oracle.generate_tags_batched(&[record("Vergecast")], 25).await;

    assert_eq!(oracle.name(), "openai");
    assert_eq!(batch.failed_batches, 0);
    assert_eq!(batch.tags[&0], vec!["tech".to_string(), "news".to_string()]);
    assert_eq!(batch.descriptions[&0], "Tech news.");
}

#[tokio::test]
async fn api_error_status_propagates_from_categorize() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = anthropic(&server)
        .categorize(&[record("Vergecast")])
        .await
        .expect_err("should fail");

    match err {
        OracleError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn prose_answer_is_a_malformed_categorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(openai_text("Sorry, I cannot help with that."))
        .mount(&server)
        .await;

    let err = openai(&server)
        .categorize(&[record("Vergecast")])
        .await
        .expect_err("should fail");
    assert!(matches!(err, OracleError::MalformedResponse(_)), "{err}");
}

#[tokio::test]
async fn missing_choice_content_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = openai(&server).complete("hello").await.expect_err("empty");
    assert!(matches!(err, OracleError::EmptyResponse));
}

#[tokio::test]
async fn anthropic_concatenates_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "{\"categories\": " },
                { "type": "text", "text": "{\"News\": [0]}}" }
            ]
        })))
        .mount(&server)
        .await;

    let text = anthropic(&server).complete("hello").await.expect("text");
    assert_eq!(text, "{\"categories\": {\"News\": [0]}}");
}

#[test]
fn factory_requires_known_provider_and_key() {
    let unknown = OracleSettings {
        provider: "gemini".into(),
        ..OracleSettings::default()
    };
    assert!(matches!(
        create_oracle(&unknown),
        Err(ConfigError::UnknownProvider(name)) if name == "gemini"
    ));

    let keyless = OracleSettings {
        provider: "openai".into(),
        anthropic_api_key: Some("only-claude".into()),
        ..OracleSettings::default()
    };
    assert!(matches!(
        create_oracle(&keyless),
        Err(ConfigError::MissingCredential(ProviderKind::OpenAi))
    ));

    let blank = OracleSettings {
        anthropic_api_key: Some("   ".into()),
        ..OracleSettings::default()
    };
    assert!(matches!(
        create_oracle(&blank),
        Err(ConfigError::MissingCredential(ProviderKind::Claude))
    ));
}

#[test]
fn factory_builds_the_selected_backend() {
    let settings = OracleSettings {
        provider: " OpenAI ".into(),
        openai_api_key: Some("sk-test".into()),
        ..OracleSettings::default()
    };
    let oracle = create_oracle(&settings).expect("oracle");
    assert_eq!(oracle.name(), "openai");

    let settings = OracleSettings {
        anthropic_api_key: Some("sk-ant".into()),
        ..OracleSettings::default()
    };
    let oracle = create_oracle(&settings).expect("oracle");
    assert_eq!(oracle.name(), "claude");
}
