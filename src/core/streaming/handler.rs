//! Stream normalizer shared by all adapters

use super::buffer::{ChunkBuffer, UsageAccumulator};
use super::types::{StreamEvent, StreamingConfig};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{ChunkStream, FinishReason, ResponseChunk, StreamSummary};
use futures::{Stream, StreamExt};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

/// Turn decoded backend events into the normalized chunk stream.
///
/// The result yields buffered `Content` chunks followed by exactly one `Done`. A backend
/// stream that ends without a finish reason, or does not finish before the deadline,
/// terminates with [`FinishReason::Incomplete`]. A backend error flushes buffered text and
/// is yielded as the last item, in which case no `Done` follows.
pub fn normalize<S>(events: S, model: impl Into<String>, config: StreamingConfig) -> ChunkStream
where
    S: Stream<Item = Result<StreamEvent, ProviderError>> + Send + 'static,
{
    let requested_model = model.into();
    let deadline = Instant::now() + config.timeout;

    let stream = async_stream::stream! {
        let mut events = Box::pin(events);
        let mut buffer = ChunkBuffer::new(config.buffer_size);
        let mut usage = UsageAccumulator::default();
        let mut model = requested_model;
        let mut finish: Option<FinishReason> = None;
        let mut timed_out = false;

        loop {
            let next = match timeout_at(deadline, events.next()).await {
                Ok(next) => next,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            };

            match next {
                None => break,
                Some(Ok(StreamEvent::Text(text))) => {
                    if let Some(chunk) = buffer.push(&text) {
                        yield Ok(ResponseChunk::Content(chunk));
                    }
                }
                Some(Ok(StreamEvent::Model(reported))) => model = reported,
                Some(Ok(StreamEvent::PromptTokens(n))) => usage.set_prompt(n),
                Some(Ok(StreamEvent::CompletionTokens(n))) => usage.set_completion(n),
                Some(Ok(StreamEvent::Usage(u))) => usage.set(u),
                Some(Ok(StreamEvent::Finish(reason))) => finish = Some(reason),
                Some(Err(e)) => {
                    if let Some(rest) = buffer.flush() {
                        yield Ok(ResponseChunk::Content(rest));
                    }
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(rest) = buffer.flush() {
            yield Ok(ResponseChunk::Content(rest));
        }

        let finish_reason = if timed_out {
            warn!(model = %model, "Stream did not finish before its deadline");
            FinishReason::Incomplete
        } else {
            finish.unwrap_or_else(|| {
                debug!(model = %model, "Stream ended without a finish reason");
                FinishReason::Incomplete
            })
        };

        yield Ok(ResponseChunk::Done(StreamSummary {
            model,
            finish_reason,
            usage: usage.usage(),
        }));
    };

    Box::pin(stream)
}
