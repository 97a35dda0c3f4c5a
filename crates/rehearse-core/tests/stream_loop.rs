//! End-to-end tests for the streaming consumer against a local fixture
//! server speaking the backend's `data:` line framing.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rehearse_core::stream::{ChatStream, SessionPhase, StreamCallbacks};
use rehearse_core::{Config, StreamError};

/// Body reader that hands out one chunk per read, pausing between chunks
struct SlowBody {
    chunks: VecDeque<Vec<u8>>,
    delay: Duration,
    mid_chunk: bool,
}

impl SlowBody {
    fn new(chunks: Vec<Vec<u8>>, delay: Duration) -> Self {
        Self {
            chunks: chunks.into(),
            delay,
            mid_chunk: false,
        }
    }
}

impl Read for SlowBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                // Pause once per logical chunk, not per partial read
                if !self.mid_chunk {
                    std::thread::sleep(self.delay);
                }
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                self.mid_chunk = n < chunk.len();
                if self.mid_chunk {
                    self.chunks.push_front(chunk[n..].to_vec());
                }
                Ok(n)
            }
            None => Ok(0),
        }
    }
}

fn event_stream_header() -> tiny_http::Header {
    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/event-stream"[..]).unwrap()
}

/// Serve each incoming request with the same chunked body
fn serve(status: u16, chunks: Vec<Vec<u8>>, delay: Duration) -> Config {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    std::thread::spawn(move || {
        while let Ok(request) = server.recv() {
            let body = SlowBody::new(chunks.clone(), delay);
            let response =
                tiny_http::Response::new(tiny_http::StatusCode(status), vec![event_stream_header()], body, None, None);
            std::thread::spawn(move || {
                let _ = request.respond(response);
            });
        }
    });
    Config {
        base_url: format!("http://127.0.0.1:{}", port),
        word_delay_ms: 1,
        ..Config::default()
    }
}

fn lines(parts: &[&str]) -> Vec<Vec<u8>> {
    parts
        .iter()
        .map(|p| format!("data: {}\n", p).into_bytes())
        .collect()
}

/// A data line followed by a large SSE comment line. The padding defeats
/// server-side write buffering so the line reaches the client while the
/// rest of the body is still pending; the decoder skips comments.
fn padded_line(part: &str) -> Vec<u8> {
    let mut chunk = format!("data: {}\n:", part).into_bytes();
    chunk.resize(chunk.len() + 16 * 1024, b'x');
    chunk.push(b'\n');
    chunk
}

struct Observed {
    tokens: Arc<Mutex<Vec<String>>>,
    completions: Arc<Mutex<Vec<String>>>,
    errors: Arc<AtomicUsize>,
}

fn observing_callbacks() -> (StreamCallbacks, Observed) {
    let tokens: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let completions: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(AtomicUsize::new(0));
    let (t, c, e) = (tokens.clone(), completions.clone(), errors.clone());
    let callbacks = StreamCallbacks {
        on_token: Some(Box::new(move |token| t.lock().push(token.to_string()))),
        on_complete: Some(Box::new(move |full| c.lock().push(full.to_string()))),
        on_error: Some(Box::new(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        })),
    };
    (
        callbacks,
        Observed {
            tokens,
            completions,
            errors,
        },
    )
}

#[tokio::test]
async fn test_stream_completes_with_full_text() {
    let config = serve(
        200,
        lines(&[r#"{"text":"Hello "}"#, r#"{"text":"world"}"#, "[DONE]"]),
        Duration::from_millis(1),
    );
    let (callbacks, observed) = observing_callbacks();
    let chat = ChatStream::with_callbacks(&config, callbacks).unwrap();

    let full = chat.start("Tell me about yourself", None).await.unwrap();

    assert_eq!(full, "Hello world");
    assert_eq!(chat.response(), "Hello world");
    assert_eq!(chat.phase(), SessionPhase::Complete);
    assert!(!chat.is_streaming());
    // Completion fires exactly once, with the full reassembled text
    assert_eq!(observed.completions.lock().as_slice(), ["Hello world"]);
    assert_eq!(observed.tokens.lock().concat(), "Hello world");
    assert_eq!(observed.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_upstream_error_fails_the_session() {
    let config = serve(
        200,
        lines(&[r#"{"error":"boom"}"#]),
        Duration::from_millis(1),
    );
    let (callbacks, observed) = observing_callbacks();
    let chat = ChatStream::with_callbacks(&config, callbacks).unwrap();

    let err = chat.start("q", None).await.unwrap_err();

    assert!(matches!(&err, StreamError::Upstream(m) if m == "boom"));
    assert_eq!(err.to_string(), "boom");
    assert_eq!(chat.phase(), SessionPhase::Errored);
    assert_eq!(chat.last_error().as_deref(), Some("boom"));
    assert!(!chat.is_streaming());
    assert_eq!(observed.errors.load(Ordering::SeqCst), 1);
    assert!(observed.completions.lock().is_empty());
}

#[tokio::test]
async fn test_malformed_line_is_skipped_and_stream_completes() {
    let config = serve(
        200,
        lines(&["{not-json}", r#"{"text":"ok"}"#, "[DONE]"]),
        Duration::from_millis(1),
    );
    let chat = ChatStream::new(&config).unwrap();

    let full = chat.start("q", None).await.unwrap();
    assert_eq!(full, "ok");
    assert_eq!(chat.phase(), SessionPhase::Complete);
}

#[tokio::test]
async fn test_http_error_status() {
    let config = serve(500, Vec::new(), Duration::ZERO);
    let (callbacks, observed) = observing_callbacks();
    let chat = ChatStream::with_callbacks(&config, callbacks).unwrap();

    let err = chat.start("q", None).await.unwrap_err();
    assert!(matches!(err, StreamError::Status(s) if s.as_u16() == 500));
    assert_eq!(chat.phase(), SessionPhase::Errored);
    assert_eq!(observed.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_eof_without_sentinel_still_completes() {
    let config = serve(
        200,
        lines(&[r#"{"text":"partial answer"}"#]),
        Duration::from_millis(1),
    );
    let (callbacks, observed) = observing_callbacks();
    let chat = ChatStream::with_callbacks(&config, callbacks).unwrap();

    let full = chat.start("q", None).await.unwrap();
    assert_eq!(full, "partial answer");
    assert_eq!(observed.completions.lock().len(), 1);
}

#[tokio::test]
async fn test_hidden_session_skips_pacing() {
    let config = serve(
        200,
        lines(&[r#"{"text":"no one "}"#, r#"{"text":"is watching"}"#, "[DONE]"]),
        Duration::from_millis(1),
    );
    let (callbacks, observed) = observing_callbacks();
    let chat = ChatStream::with_callbacks(&config, callbacks).unwrap();
    chat.visibility().set_visible(false);

    let full = chat.start("q", None).await.unwrap();
    assert_eq!(full, "no one is watching");
    assert_eq!(chat.response(), "no one is watching");
    // The display caught up in one step instead of word by word
    assert!(observed.tokens.lock().len() <= 2);
    assert_eq!(observed.tokens.lock().concat(), "no one is watching");
}

#[tokio::test]
async fn test_reset_cancels_in_flight_session() {
    // Enough slow chunks that the stream cannot finish before the reset
    let mut chunks = vec![padded_line(r#"{"text":"first "}"#)];
    for _ in 0..100 {
        chunks.push(padded_line(r#"{"text":"more "}"#));
    }
    let config = serve(200, chunks, Duration::from_millis(50));
    let chat = Arc::new(ChatStream::new(&config).unwrap());

    let worker = chat.clone();
    let handle = tokio::spawn(async move { worker.start("q", None).await });

    // Wait until the session is demonstrably under way
    while chat.response().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    chat.reset();

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(StreamError::Cancelled)));
    // Reset state sticks; the dead session wrote nothing afterwards
    assert_eq!(chat.phase(), SessionPhase::Idle);
    assert_eq!(chat.response(), "");
    assert!(chat.last_error().is_none());
}

#[tokio::test]
async fn test_new_start_supersedes_previous_session() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    std::thread::spawn(move || {
        let mut first = true;
        while let Ok(request) = server.recv() {
            let chunks: Vec<Vec<u8>> = if first {
                // Never finishes on its own
                std::iter::repeat(padded_line(r#"{"text":"stale "}"#))
                    .take(200)
                    .collect()
            } else {
                vec![
                    format!("data: {}\n", r#"{"text":"fresh"}"#).into_bytes(),
                    b"data: [DONE]\n".to_vec(),
                ]
            };
            let delay = if first {
                Duration::from_millis(50)
            } else {
                Duration::from_millis(1)
            };
            first = false;
            let body = SlowBody::new(chunks, delay);
            let response =
                tiny_http::Response::new(tiny_http::StatusCode(200), vec![event_stream_header()], body, None, None);
            std::thread::spawn(move || {
                let _ = request.respond(response);
            });
        }
    });

    let config = Config {
        base_url: format!("http://127.0.0.1:{}", port),
        word_delay_ms: 1,
        ..Config::default()
    };
    let chat = Arc::new(ChatStream::new(&config).unwrap());

    let stale = chat.clone();
    let stale_handle = tokio::spawn(async move { stale.start("q1", None).await });
    while chat.response().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let full = chat.start("q2", None).await.unwrap();
    assert_eq!(full, "fresh");
    assert_eq!(chat.response(), "fresh");
    assert_eq!(chat.phase(), SessionPhase::Complete);

    let stale_result = stale_handle.await.unwrap();
    assert!(matches!(stale_result, Err(StreamError::Cancelled)));
}
