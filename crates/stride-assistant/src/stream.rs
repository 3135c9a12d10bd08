use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::AssistantError;
use crate::sse::SseDecoder;
use crate::Result;

// ─── AbortHandle ──────────────────────────────────────────────────────────

/// Cancels the read behind a [`DeltaStream`]. Cloneable so a UI can hold it
/// while another task drains the stream.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    task: tokio::task::AbortHandle,
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

// ─── DeltaStream ──────────────────────────────────────────────────────────

/// An async stream of text fragments decoded from a chat completion stream.
///
/// A background task reads the transport, runs it through [`SseDecoder`] and
/// forwards fragments over an mpsc channel in arrival order. Dropping the
/// stream aborts the task. After [`AbortHandle::abort`] the stream yields a
/// single [`AssistantError::Aborted`] and ends.
pub struct DeltaStream {
    rx: mpsc::Receiver<Result<String>>,
    abort: AbortHandle,
    reported_abort: bool,
}

impl DeltaStream {
    /// Decode `body`, a stream of raw transport chunks.
    pub fn spawn<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<AssistantError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);

        let handle = tokio::spawn(async move {
            let mut body = Box::pin(body);
            let mut decoder = SseDecoder::new();

            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                };
                for fragment in decoder.push(bytes.as_ref()) {
                    if tx.send(Ok(fragment)).await.is_err() {
                        return; // Receiver dropped
                    }
                }
                if decoder.is_done() {
                    return;
                }
            }

            for fragment in decoder.finish() {
                if tx.send(Ok(fragment)).await.is_err() {
                    return;
                }
            }
        });

        DeltaStream {
            rx,
            abort: AbortHandle {
                task: handle.abort_handle(),
                aborted: Arc::new(AtomicBool::new(false)),
            },
            reported_abort: false,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }
}

impl Stream for DeltaStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.abort.is_aborted() {
            if self.reported_abort {
                return Poll::Ready(None);
            }
            self.reported_abort = true;
            return Poll::Ready(Some(Err(AssistantError::Aborted)));
        }
        self.rx.poll_recv(cx)
    }
}

impl Drop for DeltaStream {
    fn drop(&mut self) {
        self.abort.task.abort();
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
