use super::{
    balance::calculate_balance,
    block::join_blocks,
    config::TrackerConfig,
    entry::TimeEntry,
    parse::parse_entries,
};

const FORMAT_HINT: &str =
    "<!-- Format: Work Times: 09:00-12:00,13:00-17:00 | Break Times: 12:00-13:00 -->";

/// Merges freshly observed entries into the rows already present in the
/// document. Existing rows win on date collisions, and a date appearing twice
/// in `incoming` keeps its first occurrence. The result is ordered newest
/// first, which is the display order of the table.
pub fn merge_entries(
    existing: Vec<TimeEntry>,
    incoming: impl IntoIterator<Item = TimeEntry>,
) -> Vec<TimeEntry> {
    let mut merged = existing;
    for entry in incoming {
        if !merged.iter().any(|e| e.date == entry.date) {
            merged.push(entry);
        }
    }
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Renders the full ledger document from configuration and entries. This is
/// a pure function: identical inputs produce identical bytes, which is what
/// lets the observer skip writes when nothing changed.
pub fn render_document(config: &TrackerConfig, entries: &[TimeEntry]) -> String {
    let (_, summary) = calculate_balance(entries, config);

    let mut lines = frontmatter_and_config(config);
    lines.push(String::new());
    lines.push(summary);
    lines.push(String::new());
    lines.push("## Time Entries".to_string());
    lines.push("| Date | Type | Work Times | Break Times | Notes |".to_string());
    lines.push("|------|------|------------|-------------|--------|".to_string());
    for entry in entries {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            entry.date,
            entry.kind,
            join_blocks(&entry.work_blocks),
            join_blocks(&entry.break_blocks),
            entry.notes,
        ));
    }
    lines.push(FORMAT_HINT.to_string());
    lines.join("\n")
}

/// Re-parses the entry table of the current document, folds `new_entries`
/// into it and renders the replacement text.
pub fn generate_tracker_content(
    existing: &str,
    config: &TrackerConfig,
    new_entries: Vec<TimeEntry>,
) -> String {
    let existing_entries = if existing.is_empty() {
        Vec::new()
    } else {
        parse_entries(existing)
    };
    let merged = merge_entries(existing_entries, new_entries);
    render_document(config, &merged)
}

/// The document written on first creation: default configuration, a zeroed
/// summary and an empty table. The first regeneration replaces it wholesale,
/// so only the section markers have to line up with what the parser expects.
pub fn default_document() -> String {
    let mut lines = frontmatter_and_config(&TrackerConfig::default());
    lines.extend(
        [
            "",
            "## Summary",
            "### Overall Summary",
            "Total hours worked: 0.00h",
            "Expected hours: 0.00h",
            "Balance: +0.00h",
            "",
            "Status: ✅ On track",
            "",
            "### Monthly Summary",
            "",
            "## Time Entries",
            "| Date | Type | Work Times | Break Times | Notes |",
            "|------|------|------------|-------------|--------|",
            FORMAT_HINT,
        ]
        .map(String::from),
    );
    lines.join("\n")
}

fn frontmatter_and_config(config: &TrackerConfig) -> Vec<String> {
    vec![
        "---".to_string(),
        "time_tracker: true".to_string(),
        "---".to_string(),
        String::new(),
        "# ⏱️ Time Tracker".to_string(),
        String::new(),
        "## Configuration".to_string(),
        format!("Expected Hours per Week: {}", config.expected_hours_per_week),
        format!("Workdays: {}", config.workdays.join(", ")),
        format!("Vacation Days per Year: {}", config.vacation_days_per_year),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{block::TimeBlock, parse::parse_config};

    fn entry(date: &str, kind: &str, work: &str, breaks: &str, notes: &str) -> TimeEntry {
        TimeEntry {
            date: date.to_string(),
            kind: kind.to_string(),
            work_blocks: TimeBlock::parse_list(work),
            break_blocks: TimeBlock::parse_list(breaks),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_merge_prefers_existing_rows() {
        let existing = vec![entry("2024-03-04", "workday", "09:00-17:00", "-", "kept")];
        let incoming = vec![
            entry("2024-03-04", "workday", "10:00-11:00", "-", "dropped"),
            entry("2024-03-05", "sick", "-", "-", "added"),
        ];
        let merged = merge_entries(existing, incoming);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].date, "2024-03-05");
        assert_eq!(merged[1].notes, "kept");
    }

    #[test]
    fn test_merge_dedupes_within_incoming() {
        let incoming = vec![
            entry("2024-03-04", "workday", "09:00-10:00", "-", "first"),
            entry("2024-03-04", "workday", "11:00-12:00", "-", "second"),
        ];
        let merged = merge_entries(Vec::new(), incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].notes, "first");
    }

    #[test]
    fn test_merge_sorts_newest_first() {
        let incoming = vec![
            entry("2024-02-28", "workday", "-", "-", "-"),
            entry("2024-03-05", "workday", "-", "-", "-"),
            entry("2024-03-04", "workday", "-", "-", "-"),
        ];
        let merged = merge_entries(Vec::new(), incoming);
        let dates: Vec<&str> = merged.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-05", "2024-03-04", "2024-02-28"]);
    }

    #[test]
    fn test_render_document_layout() {
        let config = TrackerConfig::default();
        let entries = vec![entry(
            "2024-03-04",
            "workday",
            "09:00-12:00,13:00-17:00",
            "12:00-13:00",
            "standup",
        )];
        let document = render_document(&config, &entries);

        assert!(document.starts_with("---\ntime_tracker: true\n---\n\n# ⏱️ Time Tracker\n"));
        assert!(document.contains("Expected Hours per Week: 40\n"));
        assert!(document.contains(
            "Workdays: Monday, Tuesday, Wednesday, Thursday, Friday\n"
        ));
        assert!(document.contains("### Overall Summary\n"));
        assert!(document.contains(
            "| 2024-03-04 | workday | 09:00-12:00,13:00-17:00 | 12:00-13:00 | standup |"
        ));
        assert!(document.ends_with(FORMAT_HINT));
    }

    #[test]
    fn test_render_is_a_fixed_point_of_parsing() {
        let config = TrackerConfig::default();
        let entries = vec![
            entry("2024-03-05", "workday", "09:00-17:00", "12:00-13:00", "-"),
            entry("2024-03-04", "vacation", "-", "-", "away"),
        ];
        let document = render_document(&config, &entries);

        let reparsed_config = parse_config(&document);
        let reparsed_entries = parse_entries(&document);
        assert_eq!(reparsed_config, config);
        assert_eq!(reparsed_entries, entries);

        let again = generate_tracker_content(&document, &reparsed_config, reparsed_entries);
        assert_eq!(again, document);
    }

    #[test]
    fn test_generate_merges_into_existing_document() {
        let config = TrackerConfig::default();
        let original = render_document(
            &config,
            &[entry("2024-03-04", "workday", "09:00-17:00", "-", "old")],
        );
        let updated = generate_tracker_content(
            &original,
            &config,
            vec![
                entry("2024-03-04", "workday", "10:00-11:00", "-", "new"),
                entry("2024-03-05", "sick", "-", "-", "-"),
            ],
        );

        assert!(updated.contains("| 2024-03-04 | workday | 09:00-17:00 | - | old |"));
        assert!(!updated.contains("new"));
        assert!(updated.contains("| 2024-03-05 | sick | - | - | - |"));
    }

    #[test]
    fn test_default_document_parses_cleanly() {
        let document = default_document();
        assert_eq!(parse_config(&document), TrackerConfig::default());
        assert!(parse_entries(&document).is_empty());
        assert!(document.contains("## Summary\n"));
        assert!(document.contains("Balance: +0.00h\n"));
        assert!(document.ends_with(FORMAT_HINT));
    }
}
