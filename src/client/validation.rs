//! Input guardrails, enforced before any network call.

use crate::config::ServiceConfig;
use crate::error::{Error, ErrorMeta};
use crate::types::{ChatMessage, Role};
use crate::Result;

/// Rejects message lists the gateway should never see.
///
/// Message size is counted in characters, not bytes.
pub(crate) fn assert_input_safe(
    config: &ServiceConfig,
    messages: &[ChatMessage],
    requested_model: Option<&str>,
) -> Result<()> {
    if messages.is_empty() {
        return Err(Error::input_validation("messages is required.", ErrorMeta::new()));
    }

    if messages.len() > config.max_messages {
        return Err(Error::input_validation(
            "Too many messages.",
            ErrorMeta::new()
                .with_field("maxMessages", config.max_messages)
                .with_field("got", messages.len()),
        ));
    }

    for (index, msg) in messages.iter().enumerate() {
        let has_call_id = msg
            .tool_call_id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false);
        let shape_ok = match msg.role {
            Role::Tool => has_call_id,
            _ => msg.tool_call_id.is_none(),
        };
        if !shape_ok {
            return Err(Error::input_validation(
                "Invalid message shape.",
                ErrorMeta::new()
                    .with_field("index", index)
                    .with_field("role", msg.role.as_str()),
            ));
        }

        let chars = msg.content.chars().count();
        if chars > config.max_message_chars {
            return Err(Error::input_validation(
                "Message content is too long.",
                ErrorMeta::new()
                    .with_field("maxMessageChars", config.max_message_chars)
                    .with_field("got", chars),
            ));
        }
    }

    if let Some(model) = requested_model.map(str::trim).filter(|m| !m.is_empty()) {
        if !config.is_model_allowed(model) {
            return Err(Error::input_validation(
                "Model is not allowed.",
                ErrorMeta::new().with_field("model", model),
            ));
        }
    }

    Ok(())
}

/// Resolves the model for a call: the requested one when set, else the default.
pub(crate) fn pick_model(config: &ServiceConfig, requested: Option<&str>) -> Result<String> {
    let picked = requested
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| config.default_model.trim());
    if picked.is_empty() {
        return Err(Error::input_validation("Model is required.", ErrorMeta::new()));
    }
    if !config.is_model_allowed(picked) {
        return Err(Error::input_validation(
            "Model is not allowed.",
            ErrorMeta::new().with_field("model", picked),
        ));
    }
    Ok(picked.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn config() -> ServiceConfig {
        ServiceConfig::new("k", "m")
            .with_max_messages(3)
            .with_max_message_chars(5)
    }

    #[test]
    fn empty_list_rejected() {
        let err = assert_input_safe(&config(), &[], None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
        assert_eq!(err.message(), "messages is required.");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn too_many_messages_reports_limits() {
        let msgs = vec![ChatMessage::user("a"); 4];
        let err = assert_input_safe(&config(), &msgs, None).unwrap_err();
        assert_eq!(err.message(), "Too many messages.");
        assert_eq!(err.meta().fields["maxMessages"], json!(3));
        assert_eq!(err.meta().fields["got"], json!(4));
    }

    #[test]
    fn content_length_counts_chars() {
        // five multi-byte chars fit
        assert!(assert_input_safe(&config(), &[ChatMessage::user("ążźćę")], None).is_ok());
        let err = assert_input_safe(&config(), &[ChatMessage::user("abcdef")], None).unwrap_err();
        assert_eq!(err.message(), "Message content is too long.");
        assert_eq!(err.meta().fields["got"], json!(6));
    }

    #[test]
    fn tool_messages_need_call_id() {
        let mut bad = ChatMessage::tool("x", "ok");
        bad.tool_call_id = Some(" ".into());
        let err = assert_input_safe(&config(), &[bad], None).unwrap_err();
        assert_eq!(err.message(), "Invalid message shape.");

        let mut stray = ChatMessage::user("hi");
        stray.tool_call_id = Some("call_1".into());
        assert!(assert_input_safe(&config(), &[stray], None).is_err());

        assert!(assert_input_safe(&config(), &[ChatMessage::tool("call_1", "ok")], None).is_ok());
    }

    #[test]
    fn disallowed_model_rejected() {
        let cfg = config().with_allowed_models(["m", "other"]);
        let msgs = [ChatMessage::user("hi")];
        assert!(assert_input_safe(&cfg, &msgs, Some("other")).is_ok());
        let err = assert_input_safe(&cfg, &msgs, Some("evil")).unwrap_err();
        assert_eq!(err.message(), "Model is not allowed.");
        assert_eq!(err.meta().fields["model"], json!("evil"));
    }

    #[test]
    fn pick_model_falls_back_to_default() {
        let cfg = config();
        assert_eq!(pick_model(&cfg, None).unwrap(), "m");
        assert_eq!(pick_model(&cfg, Some("  ")).unwrap(), "m");
        assert_eq!(pick_model(&cfg, Some(" x/y ")).unwrap(), "x/y");
    }

    #[test]
    fn pick_model_checks_allow_list() {
        let cfg = ServiceConfig::new("k", "m").with_allowed_models(["x"]);
        let err = pick_model(&cfg, None).unwrap_err();
        assert_eq!(err.message(), "Model is not allowed.");
        assert_eq!(pick_model(&cfg, Some("x")).unwrap(), "x");

        let mut blank = ServiceConfig::new("k", "m");
        blank.default_model = " ".into();
        assert_eq!(pick_model(&blank, None).unwrap_err().message(), "Model is required.");
    }
}
