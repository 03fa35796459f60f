//! Streaming decode semantics over a mock event-stream endpoint, in both
//! execution models: sentinel termination, decode failure, falsy skips,
//! and resource release.

use databricks_genai_inference::{
    ChatCompletionRequest, ChatMessage, CompletionRequest, EnvOverrides, Error,
    FoundationModelClient, FoundationModelObject, WorkspaceConfig,
};
use futures::StreamExt;
use serde_json::json;

const CHAT_PATH: &str = "/serving-endpoints/databricks-dbrx-instruct/invocations";

fn client_for(url: &str) -> FoundationModelClient {
    FoundationModelClient::builder(WorkspaceConfig::new(url, "test-token"))
        .env_overrides(EnvOverrides::none())
        .build()
}

fn chat_request() -> ChatCompletionRequest {
    ChatCompletionRequest::new("dbrx-instruct", vec![ChatMessage::user("hi")])
}

fn sse_mock(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
    server
        .mock("POST", CHAT_PATH)
        .match_body(mockito::Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create()
}

#[test]
fn done_sentinel_stops_before_later_chunks() {
    let mut server = mockito::Server::new();
    let mock = sse_mock(
        &mut server,
        "data: {\"id\":1}\n\ndata: [DONE]\n\ndata: {\"id\":2}\n",
    );

    let client = client_for(&server.url());
    let mut stream = client.chat_completion_stream(&chat_request()).unwrap();

    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.json()["id"], 1);
    assert!(stream.next().is_none());
    // Single-pass: exhausted streams stay exhausted.
    assert!(stream.next().is_none());
    mock.assert();
}

#[test]
fn invalid_line_kills_the_stream_with_a_decode_error() {
    let mut server = mockito::Server::new();
    let _mock = sse_mock(
        &mut server,
        "data: {\"id\":1}\ndata: {broken\ndata: {\"id\":3}\n",
    );

    let client = client_for(&server.url());
    let mut stream = client.chat_completion_stream(&chat_request()).unwrap();

    assert!(stream.next().unwrap().is_ok());
    let err = stream.next().unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("JSONDecodeError"));
    // Chunks already yielded stay valid; nothing follows the failure.
    assert!(stream.next().is_none());
}

#[test]
fn falsy_payloads_are_skipped_without_terminating() {
    let mut server = mockito::Server::new();
    let _mock = sse_mock(
        &mut server,
        "data: {}\n\ndata: null\n\ndata: {\"id\":7}\n\ndata: [DONE]\n",
    );

    let client = client_for(&server.url());
    let stream = client.chat_completion_stream(&chat_request()).unwrap();
    let chunks: Vec<_> = stream.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].json()["id"], 7);
}

#[test]
fn multibyte_characters_survive_chunked_transfer() {
    use std::io::Write;

    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", CHAT_PATH)
        .match_body(mockito::Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|w| {
            // Split the two bytes of 'é' across chunk boundaries.
            w.write_all(b"data: {\"id\":\"caf\xc3")?;
            w.flush()?;
            w.write_all(b"\xa9\"}\n\ndata: [DONE]\n")
        })
        .create();

    let client = client_for(&server.url());
    let mut stream = client.chat_completion_stream(&chat_request()).unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.json()["id"], "caf\u{e9}");
    assert!(stream.next().is_none());
}

#[test]
fn failed_initiating_response_raises_without_reading_the_stream() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(429)
        .with_body("slow down")
        .create();

    let client = client_for(&server.url());
    let err = client.chat_completion_stream(&chat_request()).unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert!(err.to_string().contains("slow down"));
}

#[test]
fn completion_stream_decodes_chunks() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock(
            "POST",
            "/serving-endpoints/databricks-mpt-7b-instruct/invocations",
        )
        .match_body(mockito::Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_body(
            "data: {\"choices\":[{\"text\":\"on\"}]}\n\ndata: {\"choices\":[{\"text\":\"ce\"}]}\n\ndata: [DONE]\n",
        )
        .create();

    let client = client_for(&server.url());
    let request = CompletionRequest::new("mpt-7b-instruct", "story:");
    let chunks: Vec<_> = client
        .completion_stream(&request)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let text: String = chunks.iter().flat_map(|c| c.text()).collect();
    assert_eq!(text, "once");
}

#[tokio::test]
async fn async_stream_matches_blocking_semantics() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .match_body(mockito::Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_body("data: {\"id\":1}\n\ndata: [DONE]\n\ndata: {\"id\":2}\n")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let mut stream = client
        .chat_completion_stream_async(&chat_request())
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.json()["id"], 1);
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn async_decode_error_terminates_the_sequence() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body("data: {nope\n")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let mut stream = client
        .chat_completion_stream_async(&chat_request())
        .await
        .unwrap();

    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn async_failed_initiating_response_raises_immediately() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client
        .chat_completion_stream_async(&chat_request())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn close_is_idempotent_and_early_drop_releases_the_stream() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body("data: {\"id\":1}\n\ndata: {\"id\":2}\n\ndata: [DONE]\n")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let mut stream = client
        .chat_completion_stream_async(&chat_request())
        .await
        .unwrap();

    // Abandon after one chunk; explicit close, twice, then drop.
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.json()["id"], 1);
    stream.close();
    stream.close();
    assert!(stream.next().await.is_none());
    drop(stream);
}

#[tokio::test]
async fn async_stream_flushes_a_final_unterminated_line() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body("data: {\"id\":1}\ndata: {\"id\":2}")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let stream = client
        .chat_completion_stream_async(&chat_request())
        .await
        .unwrap();
    let chunks: Vec<_> = stream
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1].json()["id"], 2);
}
