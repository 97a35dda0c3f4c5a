//! Streamed chat with word pacing and focus-aware display
//!
//! Terminal focus stands in for page visibility: while the terminal is
//! unfocused the answer keeps accumulating without animation, and the
//! display catches up in one step when focus returns. Ctrl+C resets the
//! session, which also cancels the request.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use futures::StreamExt;
use rehearse_core::stream::{ChatStream, ImageAttachment, StreamCallbacks};
use rehearse_core::{Config, StreamError};
use tracing::warn;

pub async fn run(
    mut config: Config,
    question: String,
    image: Option<PathBuf>,
    word_delay_ms: Option<u64>,
) -> Result<()> {
    if let Some(delay) = word_delay_ms {
        config.word_delay_ms = delay;
    }
    let image = image.as_deref().map(load_attachment).transpose()?;

    let callbacks = StreamCallbacks {
        on_token: Some(Box::new(|token| {
            // Raw mode needs explicit carriage returns
            let mut stdout = std::io::stdout();
            let _ = stdout.write_all(token.replace('\n', "\r\n").as_bytes());
            let _ = stdout.flush();
        })),
        ..Default::default()
    };
    let chat = ChatStream::with_callbacks(&config, callbacks)?;

    println!("Q: {}", question);
    println!();
    match stream_answer(&chat, &question, image).await {
        Ok(_) => {
            println!();
            Ok(())
        }
        Err(StreamError::Cancelled) => {
            println!();
            eprintln!("Interrupted.");
            Ok(())
        }
        Err(err) => Err(err).context("streaming failed"),
    }
}

/// Drive the stream while watching the terminal for focus changes
async fn stream_answer(
    chat: &ChatStream,
    question: &str,
    image: Option<ImageAttachment>,
) -> Result<String, StreamError> {
    // Focus events only flow in raw mode; without a tty we stream blind
    let raw = crossterm::terminal::enable_raw_mode().is_ok();
    if raw {
        let _ = execute!(std::io::stdout(), EnableFocusChange);
    }
    scopeguard::defer! {
        if raw {
            let _ = execute!(std::io::stdout(), DisableFocusChange);
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }

    let visibility = chat.visibility();
    let mut events = EventStream::new();
    let mut watch_events = raw;

    let stream = chat.start(question, image);
    tokio::pin!(stream);
    loop {
        tokio::select! {
            result = &mut stream => return result,
            maybe = events.next(), if watch_events => match maybe {
                Some(Ok(Event::FocusLost)) => visibility.set_visible(false),
                Some(Ok(Event::FocusGained)) => visibility.set_visible(true),
                Some(Ok(Event::Key(key)))
                    if key.kind == KeyEventKind::Press
                        && key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    chat.reset();
                    return Err(StreamError::Cancelled);
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => warn!("terminal event error: {}", err),
                None => watch_events = false,
            }
        }
    }
}

fn load_attachment(path: &Path) -> Result<ImageAttachment> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let mime = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => bail!("unsupported image format: {}", path.display()),
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(ImageAttachment::from_bytes(&bytes, mime))
}
