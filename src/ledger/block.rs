use tracing::{debug, warn};

use crate::utils::time::parse_clock;

/// One contiguous `start-end` interval within a day. The boundaries are kept
/// as the raw cell text so that a malformed value survives re-rendering
/// instead of being silently dropped from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    pub start: String,
    pub end: String,
}

impl TimeBlock {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parses a block list in the compact `09:00-12:00,13:00-17:00` cell
    /// form. `-` and `N/A` are the documented empty placeholders. A segment
    /// without a `-` separator is not a block and is skipped.
    pub fn parse_list(value: &str) -> Vec<TimeBlock> {
        let mut blocks = Vec::new();
        if matches!(value.trim(), "" | "-" | "N/A") {
            return blocks;
        }
        for segment in value.split(',') {
            if let Some((start, end)) = segment.split_once('-') {
                blocks.push(TimeBlock::new(start.trim(), end.trim()));
            }
        }
        blocks
    }

    /// Minutes between the two boundaries. A boundary that does not read as
    /// `HH:MM` makes the whole block count as zero, and an end before the
    /// start yields a negative duration. There is no wraparound past
    /// midnight.
    pub fn duration_minutes(&self) -> f64 {
        let (Some(start), Some(end)) = (parse_clock(&self.start), parse_clock(&self.end)) else {
            warn!("Invalid time format: {}-{}", self.start, self.end);
            return 0.0;
        };
        let minutes = (end - start).num_minutes() as f64;
        debug!("Duration {}-{} is {minutes} minutes", self.start, self.end);
        minutes
    }
}

/// Renders blocks back into the compact cell form, `-` when there are none.
pub fn join_blocks(blocks: &[TimeBlock]) -> String {
    if blocks.is_empty() {
        return "-".to_string();
    }
    blocks
        .iter()
        .map(|block| format!("{}-{}", block.start, block.end))
        .collect::<Vec<_>>()
        .join(",")
}
