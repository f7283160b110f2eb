use super::block::TimeBlock;

/// How a ledger row participates in the balance calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Workday,
    Vacation,
    Sick,
    Other,
}

impl EntryKind {
    /// Case-insensitive. Unknown labels land on [EntryKind::Other], which
    /// still opens the week and month buckets but contributes no hours.
    pub fn from_label(label: &str) -> Self {
        match label.to_lowercase().as_str() {
            "workday" => Self::Workday,
            "vacation" => Self::Vacation,
            "sick" => Self::Sick,
            _ => Self::Other,
        }
    }
}

/// One row of the entries table. `date` doubles as the identity key: the
/// merged document never holds two rows for the same date. The kind is kept
/// as the raw label so the table re-renders exactly as the user wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub date: String,
    pub kind: String,
    pub work_blocks: Vec<TimeBlock>,
    pub break_blocks: Vec<TimeBlock>,
    pub notes: String,
}

impl TimeEntry {
    pub fn classify(&self) -> EntryKind {
        EntryKind::from_label(&self.kind)
    }

    /// Net hours for the day: work blocks minus break blocks, rounded to two
    /// decimals.
    pub fn worked_hours(&self) -> f64 {
        let work: f64 = self.work_blocks.iter().map(TimeBlock::duration_minutes).sum();
        let breaks: f64 = self
            .break_blocks
            .iter()
            .map(TimeBlock::duration_minutes)
            .sum();
        ((work - breaks) / 60.0 * 100.0).round() / 100.0
    }
}
