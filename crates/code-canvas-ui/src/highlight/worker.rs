//! Background highlighting thread.
//!
//! Requests queue up on a channel. Whenever the worker wakes it keeps
//! draining until the queue has been quiet for the debounce interval, then
//! highlights only the newest request and publishes the result.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use code_canvas_core::{HexColor, TextSnapshot, TokenPublisher};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use super::SyntaxHighlighter;

/// One unit of highlight work.
#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pub text: TextSnapshot,
    /// Used for syntax detection.
    pub file_path: Option<PathBuf>,
    pub syntax_theme: String,
    /// Color for characters no style applies to.
    pub default_color: HexColor,
}

/// Handle to the highlight thread. Dropping it stops the thread.
pub struct HighlightWorker {
    tx: Option<Sender<HighlightRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl HighlightWorker {
    /// Spawns the worker. Results are published through `publisher`.
    pub fn spawn(publisher: TokenPublisher, debounce: Duration) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("code-canvas-highlight".to_string())
            .spawn(move || run(&rx, &publisher, debounce))
            .context("Failed to spawn highlight worker")?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queues a request. Older queued requests are superseded.
    pub fn request(&self, request: HighlightRequest) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(request).is_err() {
            tracing::warn!("highlight worker is gone, request dropped");
        }
    }
}

impl Drop for HighlightWorker {
    fn drop(&mut self) {
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("highlight worker panicked");
            }
        }
    }
}

fn run(rx: &Receiver<HighlightRequest>, publisher: &TokenPublisher, debounce: Duration) {
    let mut highlighter = SyntaxHighlighter::new();
    while let Ok(first) = rx.recv() {
        let Some(latest) = settle(rx, first, debounce) else {
            break;
        };
        let started = Instant::now();
        if highlighter.current_theme() != latest.syntax_theme {
            highlighter.set_theme(&latest.syntax_theme);
        }
        let tokens =
            highlighter.tokens_for(&latest.text, latest.file_path.as_deref(), latest.default_color);
        tracing::debug!(
            chars = tokens.len(),
            elapsed_ms = started.elapsed().as_secs_f32() * 1000.0,
            "highlight pass"
        );
        publisher.publish(tokens);
    }
    tracing::debug!("highlight worker stopped");
}

/// Waits out the debounce interval, keeping only the newest request.
/// Returns `None` when the channel closed meanwhile.
fn settle(
    rx: &Receiver<HighlightRequest>,
    mut latest: HighlightRequest,
    debounce: Duration,
) -> Option<HighlightRequest> {
    loop {
        while let Ok(next) = rx.try_recv() {
            latest = next;
        }
        if debounce.is_zero() {
            return Some(latest);
        }
        match rx.recv_timeout(debounce) {
            Ok(next) => latest = next,
            Err(RecvTimeoutError::Timeout) => return Some(latest),
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use code_canvas_core::{RedrawSignal, TokenSlot};

    use super::*;

    const PLAIN: HexColor = HexColor::rgb(1, 2, 3);

    fn request(text: &str) -> HighlightRequest {
        HighlightRequest {
            text: TextSnapshot::from(text),
            file_path: Some(PathBuf::from("lib.rs")),
            syntax_theme: "base16-eighties.dark".to_string(),
            default_color: PLAIN,
        }
    }

    fn wait_for(slot: &TokenSlot, len: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if slot.load().is_some_and(|t| t.len() == len) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_publishes_tokens_for_request() {
        let slot = Arc::new(TokenSlot::default());
        let redraw = RedrawSignal::default();
        let publisher = TokenPublisher::new(Arc::clone(&slot), redraw.clone());
        let worker = HighlightWorker::spawn(publisher, Duration::ZERO).unwrap();

        worker.request(request("fn main() {}"));
        assert!(wait_for(&slot, 12));
        assert!(redraw.is_pending());
    }

    #[test]
    fn test_settle_keeps_only_the_newest_request() {
        let (tx, rx) = crossbeam_channel::unbounded();
        tx.send(request("b")).unwrap();
        tx.send(request("cc")).unwrap();
        let latest = settle(&rx, request("a"), Duration::from_millis(20)).unwrap();
        assert_eq!(latest.text.to_string(), "cc");
    }

    #[test]
    fn test_settle_reports_closed_channel() {
        let (tx, rx) = crossbeam_channel::unbounded::<HighlightRequest>();
        drop(tx);
        assert!(settle(&rx, request("a"), Duration::from_millis(20)).is_none());
    }

    #[test]
    fn test_drop_stops_the_thread() {
        let slot = Arc::new(TokenSlot::default());
        let publisher = TokenPublisher::new(slot, RedrawSignal::default());
        let worker = HighlightWorker::spawn(publisher, Duration::from_millis(1)).unwrap();
        drop(worker);
    }
}
