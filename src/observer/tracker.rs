use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    ledger::{
        balance::calculate_balance,
        parse::{parse_config, parse_entries},
        render::{default_document, generate_tracker_content},
    },
    utils::clock::Clock,
};

use super::{
    EventHandler,
    event::{NoteEvent, ObserverResult},
    store::LedgerStore,
};

/// File name of the ledger document. It is created next to whatever note
/// triggered the first event.
pub const LEDGER_FILE_NAME: &str = "_time_tracker.md";
/// Note title the ledger shows up under. Once the ledger exists, events for
/// any other title are not ours to handle.
pub const LEDGER_TITLE: &str = "_time_tracker";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decides for every incoming event whether the ledger needs to be created,
/// left alone, or regenerated. Stateless between events: everything is
/// re-derived from the document text, so a crash between two events loses
/// nothing.
pub struct TimeTrackerObserver<S> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: LedgerStore> TimeTrackerObserver<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Handles a single note event. `Ok(None)` means the event was not ours
    /// to act on; errors carry no partial state and are the caller's to log.
    pub async fn process_event(&self, event: &NoteEvent) -> Result<Option<ObserverResult>> {
        let Some(ledger_path) = ledger_path_for(event.file_path()) else {
            warn!("Event without a usable file path: {:?}", event.file_path());
            return Ok(None);
        };

        let existing = self.store.load(&ledger_path).await?;

        if existing.is_some() && event.title() != LEDGER_TITLE {
            debug!("Skipping non-ledger note: {}", event.title());
            return Ok(None);
        }

        let Some(content) = extractable_content(event, &ledger_path) else {
            return match existing {
                None => self.create_default(&ledger_path).await.map(Some),
                // An event without content must never reset a ledger that is
                // already on disk.
                Some(_) => Ok(None),
            };
        };

        if event.title() != LEDGER_TITLE {
            debug!("Skipping non-ledger note: {}", event.title());
            return Ok(None);
        }

        self.regenerate(&ledger_path, &content).await.map(Some)
    }

    async fn create_default(&self, ledger_path: &Path) -> Result<ObserverResult> {
        info!("Creating new time ledger at {ledger_path:?}");
        let content = default_document();
        self.store.replace(ledger_path, &content).await?;

        let mut metadata = self.base_metadata(0, 0.0);
        metadata.insert("time_tracker".to_string(), "true".to_string());
        Ok(ObserverResult {
            metadata,
            content: Some(content),
        })
    }

    async fn regenerate(&self, ledger_path: &Path, content: &str) -> Result<ObserverResult> {
        let config = parse_config(content);
        let entries = parse_entries(content);
        let (balance, _) = calculate_balance(&entries, &config);
        let entry_count = entries.len();

        let updated = generate_tracker_content(content, &config, entries);

        let metadata = self.base_metadata(entry_count, balance);
        if updated == content {
            debug!("Ledger already up to date, {entry_count} entries");
            return Ok(ObserverResult {
                metadata,
                content: Some(content.to_string()),
            });
        }

        info!("Regenerating ledger, {entry_count} entries, balance {balance:+.2}");
        self.store.replace(ledger_path, &updated).await?;
        Ok(ObserverResult {
            metadata,
            content: Some(updated),
        })
    }

    fn base_metadata(&self, entry_count: usize, balance: f64) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("time_entries".to_string(), entry_count.to_string());
        metadata.insert("hour_balance".to_string(), format!("{balance:+.2}"));
        metadata.insert(
            "tracker_updated".to_string(),
            self.clock.now().format(TIMESTAMP_FORMAT).to_string(),
        );
        metadata
    }
}

impl<S: LedgerStore> EventHandler for TimeTrackerObserver<S> {
    async fn handle(&mut self, event: NoteEvent) -> Result<Option<ObserverResult>> {
        self.process_event(&event).await
    }
}

/// The event's content counts only when the event is about the ledger
/// document itself and actually carries text.
fn extractable_content(event: &NoteEvent, ledger_path: &Path) -> Option<String> {
    if Path::new(event.file_path()) != ledger_path {
        return None;
    }
    let content = event.content();
    (!content.is_empty()).then(|| content.to_string())
}

/// The ledger lives in the same directory as the note the event is about.
fn ledger_path_for(file_path: &str) -> Option<PathBuf> {
    if file_path.is_empty() {
        return None;
    }
    Path::new(file_path)
        .parent()
        .map(|parent| parent.join(LEDGER_FILE_NAME))
}
