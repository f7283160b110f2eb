use tracing::warn;

use super::{block::TimeBlock, config::TrackerConfig, entry::TimeEntry};

const CONFIG_MARKER: &str = "## Configuration";
const ENTRIES_MARKER: &str = "## Time Entries";

/// Reads the `## Configuration` section. The section runs from the marker
/// line to the first blank line; a document that ends mid-section counts as
/// having none. Missing or unreadable keys keep their defaults.
pub fn parse_config(content: &str) -> TrackerConfig {
    let mut config = TrackerConfig::default();
    let Some(section) = config_section(content) else {
        return config;
    };
    for line in section {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase().replace(' ', "_");
        let value = value.trim();
        match key.as_str() {
            "expected_hours_per_week" => match value.parse::<f64>() {
                Ok(v) => config.expected_hours_per_week = v,
                Err(_) => warn!("Invalid config value for {key}: {value}"),
            },
            "workdays" => {
                config.workdays = value.split(',').map(|day| day.trim().to_string()).collect();
            }
            "vacation_days_per_year" => match value.parse::<u32>() {
                Ok(v) => config.vacation_days_per_year = v,
                Err(_) => warn!("Invalid config value for {key}: {value}"),
            },
            _ => {}
        }
    }
    config
}

/// Lines between the configuration marker and the next blank line, or `None`
/// when no terminated section exists.
fn config_section(content: &str) -> Option<Vec<&str>> {
    let mut lines = content.lines();
    lines.by_ref().find(|line| line.ends_with(CONFIG_MARKER))?;
    let mut section = Vec::new();
    for line in lines {
        if line.is_empty() {
            return Some(section);
        }
        section.push(line);
    }
    None
}

/// Reads the `## Time Entries` table, scanning from the marker to the end of
/// the document. The first `|` line is the header, `|--` lines are
/// separators, and a row needs a date plus the four remaining columns.
/// Anything shorter is dropped so one mangled row cannot take down the whole
/// parse.
pub fn parse_entries(content: &str) -> Vec<TimeEntry> {
    let mut entries = Vec::new();
    let mut in_entries = false;
    let mut header_seen = false;

    for line in content.lines() {
        if !in_entries {
            in_entries = line.starts_with(ENTRIES_MARKER);
            continue;
        }
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }
        if line.starts_with("|--") {
            continue;
        }

        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        if parts.len() < 6 || parts[1].is_empty() {
            continue;
        }
        entries.push(TimeEntry {
            date: parts[1].to_string(),
            kind: parts[2].to_string(),
            work_blocks: TimeBlock::parse_list(parts[3]),
            break_blocks: TimeBlock::parse_list(parts[4]),
            notes: parts[5].to_string(),
        });
    }

    entries
}
