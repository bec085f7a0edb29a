use super::*;
use crate::scenario::Step;

fn steps(descriptions: &[&str]) -> Vec<Step> {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| Step::new(i as u64 + 1, *d))
        .collect()
}

#[test]
fn test_model_identifiers_round_trip() {
    for model in ModelId::ALL {
        assert_eq!(ModelId::parse(model.identifier()), Some(model));
    }
    assert_eq!(ModelId::parse("claude"), None);
    assert_eq!(ModelId::parse(""), None);
}

#[test]
fn test_endpoint_map() {
    assert_eq!(ModelId::Gpt4.endpoint_path(), "/api/openRouter/gpt_4");
    assert_eq!(ModelId::Gwen3.endpoint_path(), "/api/ollama/gwen_3_06B");
    assert_eq!(ModelId::Gemini.endpoint_path(), "/api/gemini_2_0Flash");
    assert_eq!(ModelId::Llama32.endpoint_path(), "/api/ollama/llama_3_2_3B");
}

#[tokio::test]
async fn test_missing_goal_short_circuits() {
    // The base URL is unroutable; validation must win before any request.
    let dispatcher = RunDispatcher::new("http://127.0.0.1:1");
    let outcome = dispatcher.dispatch("gpt_4", "   ", &steps(&["Open app"])).await;
    assert_eq!(
        outcome,
        RunOutcome::Validation(ValidationError::MissingGoal)
    );
}

#[tokio::test]
async fn test_missing_steps_short_circuits() {
    let dispatcher = RunDispatcher::new("http://127.0.0.1:1");
    let outcome = dispatcher.dispatch("gpt_4", "Login flow", &[]).await;
    assert_eq!(
        outcome,
        RunOutcome::Validation(ValidationError::MissingSteps)
    );
}

#[tokio::test]
async fn test_invalid_model_short_circuits() {
    let dispatcher = RunDispatcher::new("http://127.0.0.1:1");
    let outcome = dispatcher
        .dispatch("claude", "Login flow", &steps(&["Open app"]))
        .await;
    assert_eq!(
        outcome,
        RunOutcome::Validation(ValidationError::InvalidModel)
    );
}

#[test]
fn test_validation_order_goal_before_steps() {
    // Both missing: goal wins.
    let dispatcher = RunDispatcher::new("http://127.0.0.1:1");
    let outcome = tokio_test::block_on(dispatcher.dispatch("claude", "", &[]));
    assert_eq!(
        outcome,
        RunOutcome::Validation(ValidationError::MissingGoal)
    );
}

#[test]
fn test_extract_error_message_priority() {
    assert_eq!(extract_error_message("\"boom\""), "boom");
    assert_eq!(extract_error_message(r#"{"message":"boom"}"#), "boom");
    assert_eq!(extract_error_message(r#"{"error":"bang"}"#), "bang");
    assert_eq!(
        extract_error_message(r#"{"message":"boom","error":"bang"}"#),
        "boom"
    );
    // Unrecognized shape falls back to the raw serialized body.
    assert_eq!(extract_error_message(r#"{"code":7}"#), r#"{"code":7}"#);
    // Plain text is a string body.
    assert_eq!(extract_error_message("not json"), "not json");
}

#[test]
fn test_user_messages() {
    assert_eq!(
        RunOutcome::Timeout.user_message(),
        "Request timed out. Please try again."
    );
    assert_eq!(
        RunOutcome::ServerError {
            status: 500,
            message: "boom".to_string()
        }
        .user_message(),
        "Server error (500): boom"
    );
    assert!(RunOutcome::Success(Value::Null).is_success());
    assert!(!RunOutcome::NoResponse.is_success());
}

#[test]
fn test_base_url_trailing_slash_is_trimmed() {
    let dispatcher = RunDispatcher::new("http://localhost:8080/");
    assert_eq!(dispatcher.base_url, "http://localhost:8080");
}
