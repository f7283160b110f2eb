/// Per-document configuration read from the `## Configuration` section.
/// Defaults apply whenever the section is missing entirely or a key is
/// absent or unreadable.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub expected_hours_per_week: f64,
    pub workdays: Vec<String>,
    pub vacation_days_per_year: u32,
}

pub const DEFAULT_WORKDAYS: [&str; 5] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            expected_hours_per_week: 40.0,
            workdays: DEFAULT_WORKDAYS.iter().map(|day| day.to_string()).collect(),
            vacation_days_per_year: 30,
        }
    }
}
