//! Tests for `build_provider`.

use narwhal_provider::{Provider, ProviderConfig, build_provider};

#[test]
fn builds_each_backend() {
    let client = llm::Client::new();
    let cases = [
        (ProviderConfig::ollama(), "ollama"),
        (ProviderConfig::lmstudio(), "lmstudio"),
        (ProviderConfig::claude("k"), "claude"),
        (ProviderConfig::openai("k"), "openai"),
    ];
    for (config, kind) in cases {
        let provider = build_provider(&config, client.clone()).unwrap();
        assert_eq!(provider.kind(), kind);
    }
}

#[test]
fn local_defaults_point_at_localhost() {
    let client = llm::Client::new();
    match build_provider(&ProviderConfig::ollama(), client.clone()).unwrap() {
        Provider::Ollama(p) => assert_eq!(p.base_url(), "http://localhost:11434"),
        _ => panic!("expected ollama"),
    }
    match build_provider(&ProviderConfig::lmstudio(), client).unwrap() {
        Provider::LmStudio(p) => assert_eq!(p.base_url(), "http://localhost:1234"),
        _ => panic!("expected lmstudio"),
    }
}

#[test]
fn missing_key_fails_to_build() {
    let client = llm::Client::new();
    let config = ProviderConfig::claude("");
    assert!(build_provider(&config, client).is_err());
}
