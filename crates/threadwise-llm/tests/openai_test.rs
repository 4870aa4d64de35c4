use mockito::Matcher;
use serde_json::json;
use threadwise_llm::{EmbeddingProvider, LLMProvider, OpenAIProvider, ProviderError};

fn provider(server: &mockito::ServerGuard) -> OpenAIProvider {
    OpenAIProvider::new("test-key")
        .unwrap()
        .with_base_url(server.url())
}

#[tokio::test]
async fn test_embed_sorts_by_index() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "text-embedding-3-small",
            "input": ["first", "second"],
            "dimensions": 2
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": [
                    { "index": 1, "embedding": [0.3, 0.4] },
                    { "index": 0, "embedding": [0.1, 0.2] }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let vectors = provider(&server)
        .with_dimensions(2)
        .embed(&["first".to_string(), "second".to_string()])
        .await
        .unwrap();

    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_embed_429_is_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let err = provider(&server)
        .embed(&["text".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited(ref body) if body == "slow down"));
    assert!(err.is_rate_limit());
}

#[tokio::test]
async fn test_embed_server_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let err = provider(&server)
        .embed(&["text".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Http { status: 500, .. }));
    assert!(!err.is_rate_limit());
}

#[tokio::test]
async fn test_embed_count_mismatch_is_invalid_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(json!({ "data": [{ "index": 0, "embedding": [1.0] }] }).to_string())
        .create_async()
        .await;

    let err = provider(&server)
        .embed(&["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_generate_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "Summarize this" }],
            "max_tokens": 512
        })))
        .with_status(200)
        .with_body(
            json!({
                "choices": [{ "message": { "role": "assistant", "content": "A summary." } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let text = provider(&server)
        .with_max_tokens(512)
        .generate("Summarize this")
        .await
        .unwrap();

    assert_eq!(text, "A summary.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generate_without_content_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(json!({ "choices": [] }).to_string())
        .create_async()
        .await;

    let err = provider(&server).generate("hi").await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}
