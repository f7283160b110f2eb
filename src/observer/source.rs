use anyhow::Result;
use futures::StreamExt;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc,
};
use tokio_stream::wrappers::LinesStream;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, warn};

use super::event::NoteEvent;

/// Reads newline-delimited event JSON from the host and feeds it into the
/// processing channel. The loop ends on cancellation or at end of input; end
/// of input also cancels the token so the rest of the pipeline winds down
/// with it.
pub struct EventSource<R> {
    input: R,
    next: mpsc::Sender<NoteEvent>,
    shutdown: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> EventSource<R> {
    pub fn new(input: R, next: mpsc::Sender<NoteEvent>, shutdown: CancellationToken) -> Self {
        Self {
            input,
            next,
            shutdown,
        }
    }

    /// Executes the reader event loop.
    pub async fn run(self) -> Result<()> {
        let Self {
            input,
            next,
            shutdown,
        } = self;
        let mut lines = LinesStream::new(input.lines());

        loop {
            let line = tokio::select! {
                // Cancellation wins over a ready line so shutdown is prompt.
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                line = lines.next() => line,
            };
            let Some(line) = line.transpose()? else {
                debug!("Event input closed");
                shutdown.cancel();
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<NoteEvent>(&line) {
                Ok(event) => {
                    let span = info_span!("Forwarding note event");
                    debug!("Received event for {:?}", event.title());
                    next.send(event)
                        .instrument(span)
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
                Err(e) => {
                    // ignore illegal lines, the host stream picks back up on
                    // the next one
                    warn!("Found illegal json string {line}: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::utils::logging::TEST_LOGGING;

    use super::{EventSource, NoteEvent};

    fn event_line(title: &str) -> String {
        let event = NoteEvent::Updated {
            title: title.to_string(),
            content: "# Note".to_string(),
            file_path: format!("/notes/{title}.md"),
            frontmatter: HashMap::new(),
        };
        serde_json::to_string(&event).unwrap() + "\n"
    }

    #[tokio::test]
    async fn test_source_forwards_events_and_skips_bad_lines() -> Result<()> {
        *TEST_LOGGING;
        let input = format!("{}not json\n\n{}", event_line("first"), event_line("second"));

        let (sender, mut receiver) = mpsc::channel(10);
        let source = EventSource::new(input.as_bytes(), sender, CancellationToken::new());
        source.run().await?;

        assert_eq!(receiver.recv().await.unwrap().title(), "first");
        assert_eq!(receiver.recv().await.unwrap().title(), "second");
        assert!(receiver.recv().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_source_stops_when_cancelled() -> Result<()> {
        let token = CancellationToken::new();
        token.cancel();

        let input = event_line("ignored");
        let (sender, mut receiver) = mpsc::channel(10);
        let source = EventSource::new(input.as_bytes(), sender, token);
        source.run().await?;

        assert!(receiver.recv().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_end_of_input_cancels_the_token() -> Result<()> {
        let token = CancellationToken::new();
        let (sender, _receiver) = mpsc::channel(10);
        let source = EventSource::new(&b""[..], sender, token.clone());
        source.run().await?;

        assert!(token.is_cancelled());
        Ok(())
    }
}
