//! Engine facade behavior against an in-memory store.
//!
//! Provider calls point at a closed local port, so transport failures
//! are immediate and deterministic.

use futures_util::StreamExt;
use llm::LlmError;
use narwhal_runtime::{ChatClient, ChatError, EngineConfig, InMemoryStore, Status};
use provider::ProviderConfig;

fn unreachable_client() -> ChatClient<InMemoryStore> {
    let config: ProviderConfig =
        serde_json::from_str(r#"{"provider": "ollama", "base_url": "http://127.0.0.1:9"}"#)
            .unwrap();
    ChatClient::new(config, EngineConfig::default(), InMemoryStore::new()).unwrap()
}

#[tokio::test]
async fn save_turn_persists_with_the_active_instruction() {
    let client = unreachable_client();
    let id = client
        .save_turn("default", "q", "a", None, "llama3")
        .await
        .unwrap();
    assert_eq!(id, 0);
    assert_eq!(client.store().len("default"), Some(1));
}

#[tokio::test]
async fn fresh_client_is_not_generating() {
    let client = unreachable_client();
    assert!(!client.is_generating());
    // Cancelling with no session is a no-op.
    client.cancel().await;
}

#[tokio::test]
async fn unreachable_provider_fails_the_generation() {
    let client = unreachable_client();
    let generation = client
        .generate("default", "hello", None, "llama3")
        .await
        .unwrap();
    match generation.finish().await {
        Err(ChatError::Generation(LlmError::Unreachable(_))) => {}
        other => panic!("expected unreachable, got {other:?}"),
    }
    assert!(!client.is_generating());
}

#[tokio::test]
async fn model_listing_surfaces_transport_errors() {
    let client = unreachable_client();
    assert!(matches!(
        client.models().await,
        Err(LlmError::Unreachable(_))
    ));
}

#[tokio::test]
async fn set_provider_cancels_a_running_session() {
    // A bound socket that never accepts: the request is sent but no
    // response ever arrives, so the session stays running until told
    // otherwise.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let config: ProviderConfig = serde_json::from_str(&format!(
        r#"{{"provider": "ollama", "base_url": "http://{}"}}"#,
        listener.local_addr().unwrap()
    ))
    .unwrap();
    let mut client = ChatClient::new(config, EngineConfig::default(), InMemoryStore::new()).unwrap();

    let mut generation = client
        .generate("default", "hello", None, "llama3")
        .await
        .unwrap();
    assert!(client.is_generating());

    let next: ProviderConfig =
        serde_json::from_str(r#"{"provider": "claude", "api_key": "k"}"#).unwrap();
    client.set_provider(next).await.unwrap();

    assert!(!client.is_generating());
    assert_eq!(generation.handle().status(), Status::Cancelled);
    assert_eq!(generation.handle().fragments(), 0);
    assert!(generation.next().await.is_none());
}

#[tokio::test]
async fn set_provider_rejects_invalid_config() {
    let mut client = unreachable_client();
    let missing_key: ProviderConfig = serde_json::from_str(r#"{"provider": "claude"}"#).unwrap();
    assert!(client.set_provider(missing_key).await.is_err());

    let valid: ProviderConfig =
        serde_json::from_str(r#"{"provider": "claude", "api_key": "k"}"#).unwrap();
    client.set_provider(valid).await.unwrap();
    assert_eq!(client.provider_config().kind(), "claude");
}
