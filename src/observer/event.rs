use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Change notification for a single note, as the host application delivers
/// it: one JSON object per line, tagged with the kind of change. All three
/// variants carry the same payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NoteEvent {
    Created {
        title: String,
        content: String,
        file_path: String,
        #[serde(default)]
        frontmatter: HashMap<String, String>,
    },
    Updated {
        title: String,
        content: String,
        file_path: String,
        #[serde(default)]
        frontmatter: HashMap<String, String>,
    },
    Synced {
        title: String,
        content: String,
        file_path: String,
        #[serde(default)]
        frontmatter: HashMap<String, String>,
    },
}

impl NoteEvent {
    pub fn title(&self) -> &str {
        match self {
            NoteEvent::Created { title, .. }
            | NoteEvent::Updated { title, .. }
            | NoteEvent::Synced { title, .. } => title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            NoteEvent::Created { content, .. }
            | NoteEvent::Updated { content, .. }
            | NoteEvent::Synced { content, .. } => content,
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            NoteEvent::Created { file_path, .. }
            | NoteEvent::Updated { file_path, .. }
            | NoteEvent::Synced { file_path, .. } => file_path,
        }
    }
}

/// Outcome of handling one event: metadata for the host to attach to the
/// note, plus the full replacement document when the handler produced one.
/// The metadata map is ordered so the emitted JSON is stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverResult {
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_decodes_from_host_json() {
        let line = r##"{"Updated":{"title":"daily","content":"# Daily","file_path":"/notes/daily.md","frontmatter":{"tags":"journal"}}}"##;
        let event: NoteEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.title(), "daily");
        assert_eq!(event.content(), "# Daily");
        assert_eq!(event.file_path(), "/notes/daily.md");
    }

    #[test]
    fn test_event_tolerates_missing_frontmatter() {
        let line = r#"{"Created":{"title":"a","content":"","file_path":"/notes/a.md"}}"#;
        let event: NoteEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.title(), "a");
    }

    #[test]
    fn test_result_omits_absent_content() {
        let result = ObserverResult {
            metadata: BTreeMap::from([("time_entries".to_string(), "0".to_string())]),
            content: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"metadata":{"time_entries":"0"}}"#);
    }
}
