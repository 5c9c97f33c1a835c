//! The streaming pipeline task and the handle returned to callers.

use crate::error::ClientError;
use crate::messages::ChatCompletionChunk;
use crate::streaming::sse::{SseDecoder, SseFrame};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Longest slice of a skipped frame that is written to the log.
const LOGGED_FRAME_LIMIT: usize = 200;

/// How a stream ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The `[DONE]` sentinel arrived
    Completed,
    /// The stream was cancelled or the receiver was dropped
    Cancelled,
}

/// Handle that stops a running stream.
///
/// Cancelling stops further reads, closes the connection and closes the
/// delta channel. It is safe to call more than once.
#[derive(Debug, Clone)]
pub struct StreamCanceller {
    token: CancellationToken,
}

impl StreamCanceller {
    fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Requests cancellation of the stream.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A live streamed chat completion.
///
/// Deltas arrive in receipt order through [`recv`](Self::recv) (or by using
/// the value as a [`Stream`]). The channel closes when the stream ends for
/// any reason; [`finish`](Self::finish) then reports why.
pub struct ChatCompletionStream {
    receiver: mpsc::Receiver<ChatCompletionChunk>,
    canceller: StreamCanceller,
    task: JoinHandle<Result<StreamOutcome, ClientError>>,
}

impl fmt::Debug for ChatCompletionStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionStream")
            .field("canceller", &self.canceller)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionStream {
    /// Receives the next delta, or `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<ChatCompletionChunk> {
        self.receiver.recv().await
    }

    /// Returns a handle that can cancel this stream from anywhere.
    #[must_use]
    pub fn canceller(&self) -> StreamCanceller {
        self.canceller.clone()
    }

    /// Cancels the stream.
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    /// Closes the channel and waits for the pipeline to end.
    ///
    /// Deltas not yet received are discarded; drain with
    /// [`recv`](Self::recv) first to keep them.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if reading the body failed and `Stream` if the
    /// connection closed before the `[DONE]` sentinel.
    pub async fn finish(self) -> Result<StreamOutcome, ClientError> {
        let Self {
            receiver, task, ..
        } = self;
        drop(receiver);

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(ClientError::stream(format!("stream task failed: {e}"))),
        }
    }
}

impl Stream for ChatCompletionStream {
    type Item = ChatCompletionChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Spawns the pipeline task over a response body.
///
/// The task's token is a child of `parent`, so cancelling the caller's
/// context also stops the stream.
pub fn spawn_pipeline<S, E>(
    body: S,
    parent: &CancellationToken,
    capacity: usize,
) -> ChatCompletionStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let token = parent.child_token();
    let (sender, receiver) = mpsc::channel(capacity.max(1));

    let pipeline = Pipeline {
        sender,
        token: token.clone(),
        delivered: 0,
        skipped: 0,
    };
    let task = tokio::spawn(pipeline.run(body));

    ChatCompletionStream {
        receiver,
        canceller: StreamCanceller::new(token),
        task,
    }
}

struct Pipeline {
    sender: mpsc::Sender<ChatCompletionChunk>,
    token: CancellationToken,
    delivered: u64,
    skipped: u64,
}

impl Pipeline {
    async fn run<S, E>(mut self, body: S) -> Result<StreamOutcome, ClientError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        let mut body = std::pin::pin!(body);
        let mut decoder = SseDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                () = self.token.cancelled() => return Ok(self.cancelled()),
                next = body.next() => next,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    tracing::error!(error = %e, frames = self.delivered, "Stream read failed");
                    return Err(ClientError::transport(format!("stream read failed: {e}")));
                }
                None => break,
            };

            for frame in decoder.push(&chunk) {
                if let ControlFlow::Break(outcome) = self.handle_frame(frame).await {
                    return Ok(outcome);
                }
            }
        }

        if let Some(frame) = decoder.finish() {
            if let ControlFlow::Break(outcome) = self.handle_frame(frame).await {
                return Ok(outcome);
            }
        }

        tracing::error!(
            frames = self.delivered,
            skipped = self.skipped,
            "Stream closed before [DONE]"
        );
        Err(ClientError::stream(format!(
            "connection closed before [DONE] after {} deltas",
            self.delivered
        )))
    }

    async fn handle_frame(&mut self, frame: SseFrame) -> ControlFlow<StreamOutcome> {
        let data = match frame {
            SseFrame::Done => {
                tracing::info!(
                    frames = self.delivered,
                    skipped = self.skipped,
                    "Stream completed"
                );
                return ControlFlow::Break(StreamOutcome::Completed);
            }
            SseFrame::Data(data) => data,
        };

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(&data) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(
                    error = %e,
                    frame = %truncate(&data, LOGGED_FRAME_LIMIT),
                    "Skipping malformed stream frame"
                );
                return ControlFlow::Continue(());
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => ControlFlow::Break(self.cancelled()),
            sent = self.sender.send(chunk) => match sent {
                Ok(()) => {
                    self.delivered += 1;
                    tracing::trace!(frames = self.delivered, "Delta delivered");
                    ControlFlow::Continue(())
                }
                Err(_) => {
                    tracing::debug!(frames = self.delivered, "Receiver dropped; stopping stream");
                    ControlFlow::Break(StreamOutcome::Cancelled)
                }
            },
        }
    }

    fn cancelled(&self) -> StreamOutcome {
        tracing::info!(frames = self.delivered, "Stream cancelled");
        StreamOutcome::Cancelled
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn chunk_frame(id: &str, content: &str) -> Bytes {
        Bytes::from(format!(
            "data: {{\"id\":\"{id}\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"m\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{content}\"}},\"finish_reason\":null}}]}}\n\n"
        ))
    }

    fn source(
        parts: Vec<Bytes>,
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
        futures::stream::iter(parts.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn delivers_deltas_in_order_and_completes() {
        let body = source(vec![
            chunk_frame("a", "Hel"),
            chunk_frame("b", "lo"),
            Bytes::from_static(b"data: [DONE]\n\n"),
        ]);

        let mut stream = spawn_pipeline(body, &CancellationToken::new(), 8);

        assert_eq!(stream.recv().await.unwrap().id, "a");
        assert_eq!(stream.recv().await.unwrap().id, "b");
        assert!(stream.recv().await.is_none());
        assert_eq!(stream.finish().await.unwrap(), StreamOutcome::Completed);
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped() {
        let body = source(vec![
            chunk_frame("a", "x"),
            Bytes::from_static(b"data: {not json\n\n"),
            chunk_frame("b", "y"),
            Bytes::from_static(b"data: [DONE]\n\n"),
        ]);

        let stream = spawn_pipeline(body, &CancellationToken::new(), 8);
        let ids: Vec<String> = stream.map(|c| c.id).collect().await;

        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn closed_before_done_is_a_stream_error() {
        let body = source(vec![chunk_frame("a", "x")]);

        let mut stream = spawn_pipeline(body, &CancellationToken::new(), 8);

        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_none());
        let error = stream.finish().await.unwrap_err();
        assert!(matches!(
            error.kind,
            crate::error::ClientErrorKind::Stream { .. }
        ));
    }

    #[tokio::test]
    async fn read_error_is_a_transport_error() {
        let body = futures::stream::iter(vec![
            Ok(chunk_frame("a", "x")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);

        let mut stream = spawn_pipeline(body, &CancellationToken::new(), 8);

        assert!(stream.recv().await.is_some());
        let error = stream.finish().await.unwrap_err();
        assert!(error.is_transport());
        assert!(error.to_string().contains("reset"));
    }

    #[tokio::test]
    async fn cancel_stops_reading() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let body = async_stream::stream! {
            for id in ["a", "b"] {
                counter.fetch_add(1, Ordering::SeqCst);
                yield Ok::<_, std::io::Error>(chunk_frame(id, "x"));
            }
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::pending::<()>().await;
        };

        let mut stream = spawn_pipeline(body, &CancellationToken::new(), 8);
        assert!(stream.recv().await.is_some());
        assert!(stream.recv().await.is_some());

        stream.cancel();

        let closed = tokio::time::timeout(Duration::from_secs(1), stream.recv())
            .await
            .unwrap();
        assert!(closed.is_none());
        assert_eq!(stream.finish().await.unwrap(), StreamOutcome::Cancelled);
        assert!(reads.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn parent_token_cancels_stream() {
        let parent = CancellationToken::new();
        let body = futures::stream::pending::<Result<Bytes, std::io::Error>>();

        let mut stream = spawn_pipeline(body, &parent, 8);
        parent.cancel();

        let closed = tokio::time::timeout(Duration::from_secs(1), stream.recv())
            .await
            .unwrap();
        assert!(closed.is_none());
        assert!(stream.canceller().is_cancelled());
    }

    #[tokio::test]
    async fn cancel_with_full_channel_does_not_deadlock() {
        let body = futures::stream::iter((0..10).map(|i| Ok::<_, std::io::Error>(chunk_frame(&i.to_string(), "x"))))
            .chain(futures::stream::pending());

        let stream = spawn_pipeline(body, &CancellationToken::new(), 1);
        tokio::time::sleep(Duration::from_millis(20)).await;

        stream.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(1), stream.finish())
            .await
            .unwrap();
        assert_eq!(outcome.unwrap(), StreamOutcome::Cancelled);
    }

    #[tokio::test]
    async fn finish_without_draining_releases_the_task() {
        let body = futures::stream::iter((0..10).map(|i| Ok::<_, std::io::Error>(chunk_frame(&i.to_string(), "x"))))
            .chain(futures::stream::pending());

        let stream = spawn_pipeline(body, &CancellationToken::new(), 1);

        let outcome = tokio::time::timeout(Duration::from_secs(1), stream.finish())
            .await
            .unwrap();
        assert_eq!(outcome.unwrap(), StreamOutcome::Cancelled);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
