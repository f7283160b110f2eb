use anyhow::Result;
use tokio::{io::BufReader, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::utils::clock::SystemClock;

use event::{NoteEvent, ObserverResult};
use source::EventSource;
use store::FileLedgerStore;
use tracker::TimeTrackerObserver;

pub mod event;
pub mod shutdown;
pub mod source;
pub mod store;
pub mod tracker;

/// Represents a handler for note events. This should realistically be able to
/// abstract over different ledger kinds living in the same notes directory.
pub trait EventHandler {
    fn handle(
        &mut self,
        event: NoteEvent,
    ) -> impl std::future::Future<Output = Result<Option<ObserverResult>>>;
}

/// Runs incoming events through the handler. Each produced result goes out as
/// one JSON line on stdout, which is the only thing the host reads from this
/// process.
pub struct ObserveModule<Handler> {
    receiver: mpsc::Receiver<NoteEvent>,
    handler: Handler,
}

impl<H: EventHandler> ObserveModule<H> {
    pub fn new(receiver: mpsc::Receiver<NoteEvent>, handler: H) -> Self {
        Self { receiver, handler }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(event) = self.receiver.recv().await {
            debug!("Processing event for {:?}", event.title());
            match self.handler.handle(event).await {
                Ok(Some(result)) => match serde_json::to_string(&result) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!("Failed to encode result: {e:?}"),
                },
                Ok(None) => debug!("Event needed no action"),
                Err(e) => error!("Error processing event: {e:?}"),
            }
        }

        self.receiver.close();
        Ok(())
    }
}

/// Represents the starting point for the observe loop: stdin in, result JSON
/// lines out, until the host closes the stream or the process gets ctrl-c.
pub async fn start_observer() -> Result<()> {
    let (sender, receiver) = mpsc::channel::<NoteEvent>(10);

    let shutdown_token = CancellationToken::new();

    let source = EventSource::new(
        BufReader::new(tokio::io::stdin()),
        sender,
        shutdown_token.clone(),
    );
    let module = create_observe_module(receiver);

    let (_, source_result, processing_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        source.run(),
        module.run(),
    );

    if let Err(source_result) = source_result {
        error!("Event source got an error {:?}", source_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Observe module got an error {:?}", processing_result);
    }

    Ok(())
}

fn create_observe_module(
    receiver: mpsc::Receiver<NoteEvent>,
) -> ObserveModule<TimeTrackerObserver<FileLedgerStore>> {
    let tracker = TimeTrackerObserver::new(FileLedgerStore, Box::new(SystemClock));
    ObserveModule::new(receiver, tracker)
}

#[cfg(test)]
mod observer_tests {
    use std::collections::HashMap;

    use anyhow::Result;
    use tempfile::tempdir;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        ledger::render::default_document,
        observer::{
            create_observe_module, event::NoteEvent, source::EventSource,
            tracker::LEDGER_FILE_NAME,
        },
        utils::logging::TEST_LOGGING,
    };

    fn note_event(dir: &std::path::Path, title: &str, content: &str) -> NoteEvent {
        NoteEvent::Updated {
            title: title.to_string(),
            content: content.to_string(),
            file_path: dir.join(format!("{title}.md")).to_string_lossy().to_string(),
            frontmatter: HashMap::new(),
        }
    }

    /// Very simple smoke test to check that the whole pipeline holds
    /// together: events come in over an in-memory reader and a ledger lands
    /// on disk.
    #[tokio::test]
    async fn smoke_test_observe_pipeline() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;

        let events = [
            note_event(dir.path(), "daily", "# Daily"),
            note_event(dir.path(), "daily", "# Daily\nmore text"),
        ];
        let mut input = String::new();
        for event in &events {
            input.push_str(&serde_json::to_string(event)?);
            input.push('\n');
        }

        let (sender, receiver) = mpsc::channel(10);
        let source = EventSource::new(input.as_bytes(), sender, CancellationToken::new());
        let module = create_observe_module(receiver);

        let (source_result, processing_result) = tokio::join!(source.run(), module.run());
        source_result?;
        processing_result?;

        // The first event creates the ledger, the second is for a foreign
        // note and must leave it alone.
        let ledger = tokio::fs::read_to_string(dir.path().join(LEDGER_FILE_NAME)).await?;
        assert_eq!(ledger, default_document());
        Ok(())
    }
}
