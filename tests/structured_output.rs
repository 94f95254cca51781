//! Structured completions end to end over a scripted transport.

mod support;

use flashcards_ai::schemas::flashcards::SCHEMA_NAME;
use flashcards_ai::schemas::{
    chat_reply_schema, generate_cards_schema, generation_messages, generation_options,
};
use flashcards_ai::structured::{FnSchema, ValidationError};
use flashcards_ai::{CompletionOptions, Error, ErrorKind, GatewayClient, ResponseFormat};
use serde_json::{json, Value};
use std::sync::Arc;
use support::{completion_body, config, ScriptedTransport, Step};

fn client_with(transport: Arc<ScriptedTransport>) -> GatewayClient {
    GatewayClient::builder(config())
        .transport(transport)
        .build()
        .expect("valid config")
}

fn replying(content: &str) -> Arc<ScriptedTransport> {
    Arc::new(ScriptedTransport::always(
        Step::json(200, completion_body("gen-9", "m", content)).with_header("x-request-id", "req-s"),
    ))
}

fn cards_json() -> String {
    json!({
        "cards": [
            {"front": "What makes ATP?", "back": "Mitochondria", "context": null, "difficulty": 2, "tags": ["bio"]},
            {"front": "Cell wall?", "back": "Plants", "context": "Botany", "difficulty": null, "tags": null}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn valid_cards_are_decoded() {
    let transport = replying(&cards_json());
    let client = client_with(transport.clone());
    let schema = generate_cards_schema().unwrap();

    let out = client
        .send_completion_structured(&generation_messages("cells"), &generation_options(), &schema)
        .await
        .unwrap();

    assert_eq!(out.data.cards.len(), 2);
    assert_eq!(out.data.cards[0].back, "Mitochondria");
    assert_eq!(out.data.cards[1].context.as_deref(), Some("Botany"));
    assert_eq!(out.raw.id, "gen-9");
    assert_eq!(out.raw.request_id.as_deref(), Some("req-s"));

    let body = &transport.requests()[0].body;
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(body["response_format"]["json_schema"]["name"], SCHEMA_NAME);
    assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    assert_eq!(body["temperature"], json!(0.2));
    assert_eq!(body["max_tokens"], json!(1200));
}

#[tokio::test]
async fn non_json_content_is_parse_error() {
    let client = client_with(replying("Here are your cards: ..."));
    let schema = generate_cards_schema().unwrap();

    let err = client
        .send_completion_structured(&generation_messages("x"), &generation_options(), &schema)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResponseParse);
    assert_eq!(err.message(), "OpenRouter structured output is not valid JSON.");
    assert_eq!(err.meta().fields["schema"], json!(SCHEMA_NAME));
    assert_eq!(err.meta().request_id.as_deref(), Some("req-s"));
}

#[tokio::test]
async fn schema_mismatch_is_validation_error() {
    let client = client_with(replying(r#"{"cards": []}"#));
    let schema = generate_cards_schema().unwrap();

    let err = client
        .send_completion_structured(&generation_messages("x"), &generation_options(), &schema)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SchemaValidation);
    assert_eq!(err.status(), 500);
    match &err {
        Error::SchemaValidation { source, .. } => {
            assert_eq!(source.path.as_deref(), Some("/cards"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unsupported_structured_output_is_detected() {
    let transport = Arc::new(ScriptedTransport::always(Step::json(
        400,
        json!({"error": {"message": "This model does not support response_format json_schema"}}),
    )));
    let client = client_with(transport.clone());
    let schema = generate_cards_schema().unwrap();

    let err = client
        .send_completion_structured(&generation_messages("x"), &generation_options(), &schema)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    assert_eq!(err.status(), 502);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn same_400_on_plain_call_is_upstream() {
    let transport = Arc::new(ScriptedTransport::always(Step::json(
        400,
        json!({"error": {"message": "This model does not support response_format json_schema"}}),
    )));
    let client = client_with(transport);

    let err = client
        .send_completion(&generation_messages("x"), &CompletionOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn response_format_in_options_makes_plain_call_structured() {
    let transport = Arc::new(ScriptedTransport::always(Step::json(
        400,
        json!({"error": "structured outputs unavailable"}),
    )));
    let client = client_with(transport.clone());
    let options = CompletionOptions::new()
        .response_format(ResponseFormat::json_schema("anything", json!({"type": "object"})));

    let err = client
        .send_completion(&generation_messages("x"), &options)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedFeature);
    assert_eq!(transport.requests()[0].body["response_format"]["json_schema"]["name"], "anything");
}

#[tokio::test]
async fn schema_overrides_response_format_in_options() {
    let transport = replying(&cards_json());
    let client = client_with(transport.clone());
    let schema = generate_cards_schema().unwrap();
    let options = generation_options()
        .response_format(ResponseFormat::json_schema("stale", json!({"type": "object"})));

    client
        .send_completion_structured(&generation_messages("x"), &options, &schema)
        .await
        .unwrap();

    let body = &transport.requests()[0].body;
    assert_eq!(body["response_format"]["json_schema"]["name"], SCHEMA_NAME);
}

#[tokio::test]
async fn derived_contract_round_trips_chat_reply() {
    let reply = json!({
        "answer": "ATP synthase.",
        "followUps": ["Where is it located?"],
        "safety": {"flagged": false, "reason": ""}
    });
    let transport = replying(&reply.to_string());
    let client = client_with(transport.clone());
    let schema = chat_reply_schema().unwrap();

    let out = client
        .send_completion_structured(&generation_messages("x"), &CompletionOptions::new(), &schema)
        .await
        .unwrap();

    assert_eq!(out.data.answer, "ATP synthase.");
    assert_eq!(out.data.follow_ups, vec!["Where is it located?".to_string()]);
    let sent = &transport.requests()[0].body["response_format"]["json_schema"];
    assert_eq!(sent["name"], "chat_reply_v1");
    assert_eq!(sent["schema"]["additionalProperties"], false);
}

#[tokio::test]
async fn custom_function_contract() {
    let format = ResponseFormat::json_schema("count_v1", json!({"type": "object"}));
    let schema = FnSchema::new(format, |v: &Value| {
        v.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| ValidationError::with_path("count must be an integer", "/count"))
    });
    let client = client_with(replying(r#"{"count": "three"}"#));

    let err = client
        .send_completion_structured(&generation_messages("x"), &CompletionOptions::new(), &schema)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaValidation);

    let client = client_with(replying(r#"{"count": 3}"#));
    let out = client
        .send_completion_structured(&generation_messages("x"), &CompletionOptions::new(), &schema)
        .await
        .unwrap();
    assert_eq!(out.data, 3);
}
