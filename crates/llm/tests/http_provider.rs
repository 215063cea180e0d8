//! Tests for HttpProvider header construction.

use narwhal_llm::HttpProvider;

#[test]
fn bearer_sets_authorization_header() {
    let client = narwhal_llm::Client::new();
    let provider = HttpProvider::bearer(client, "test-key", "https://api.openai.com/")
        .expect("bearer provider");

    let auth = provider
        .headers()
        .get("authorization")
        .expect("authorization header");
    assert_eq!(auth.to_str().unwrap(), "Bearer test-key");
    assert_eq!(provider.base_url(), "https://api.openai.com");
}

#[test]
fn no_auth_omits_authorization_header() {
    let client = narwhal_llm::Client::new();
    let provider = HttpProvider::no_auth(client, "http://localhost:11434");

    assert!(provider.headers().get("authorization").is_none());
    assert_eq!(provider.base_url(), "http://localhost:11434");
}

#[test]
fn custom_header_sets_named_header() {
    let client = narwhal_llm::Client::new();
    let mut provider =
        HttpProvider::custom_header(client, "x-api-key", "sk-123", "https://api.anthropic.com")
            .expect("custom header provider");
    provider.insert_header("anthropic-version", "2023-06-01");

    let key = provider.headers().get("x-api-key").expect("x-api-key");
    assert_eq!(key.to_str().unwrap(), "sk-123");
    assert!(provider.headers().get("authorization").is_none());
    let version = provider
        .headers()
        .get("anthropic-version")
        .expect("version header");
    assert_eq!(version.to_str().unwrap(), "2023-06-01");
}

#[test]
fn bearer_sets_content_type_and_accept() {
    let client = narwhal_llm::Client::new();
    let provider = HttpProvider::bearer(client, "k", "http://example.com").expect("bearer provider");

    let ct = provider.headers().get("content-type").expect("content-type");
    assert_eq!(ct.to_str().unwrap(), "application/json");
    let accept = provider.headers().get("accept").expect("accept");
    assert_eq!(accept.to_str().unwrap(), "application/json");
}

#[test]
fn invalid_key_is_an_auth_error() {
    let client = narwhal_llm::Client::new();
    let err = HttpProvider::bearer(client, "bad\nkey", "http://example.com").unwrap_err();
    assert!(matches!(err, narwhal_llm::LlmError::Auth(_)));
}
