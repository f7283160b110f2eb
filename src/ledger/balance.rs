use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::utils::time::{format_day, month_key, week_key, week_start};

use super::{
    config::TrackerConfig,
    entry::{EntryKind, TimeEntry},
};

/// Hours worked and absence days for one `YYYY-Wnn` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekStat {
    pub worked: f64,
    pub expected: f64,
    pub start_date: NaiveDate,
    pub vacation_days: u32,
    pub sick_days: u32,
}

/// Hours worked and absence days for one `YYYY-MM` bucket. A month carries a
/// flat four weeks of expected hours no matter how many days it has in the
/// table.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthStat {
    pub worked: f64,
    pub expected: f64,
    pub vacation_days: u32,
    pub sick_days: u32,
}

#[derive(Default)]
struct Totals {
    worked: f64,
    expected: f64,
}

/// Folds all entries into weekly and monthly buckets and renders the summary
/// block. Returns the overall balance, worked minus expected hours, together
/// with the summary text.
///
/// A single bad entry, usually one with an unreadable date, is logged and
/// skipped. It never aborts the rest of the aggregation.
pub fn calculate_balance(entries: &[TimeEntry], config: &TrackerConfig) -> (f64, String) {
    let mut totals = Totals::default();
    let mut monthly = BTreeMap::<String, MonthStat>::new();
    let mut weekly = BTreeMap::<String, WeekStat>::new();

    for entry in entries {
        if let Err(e) = tally_entry(entry, config, &mut totals, &mut monthly, &mut weekly) {
            warn!("Error processing entry {}: {e}", entry.date);
        }
    }

    let balance = totals.worked - totals.expected;
    let summary = render_summary(balance, &totals, &monthly, &weekly);
    (balance, summary)
}

fn tally_entry(
    entry: &TimeEntry,
    config: &TrackerConfig,
    totals: &mut Totals,
    monthly: &mut BTreeMap<String, MonthStat>,
    weekly: &mut BTreeMap<String, WeekStat>,
) -> Result<()> {
    // A leaked header row looks like an entry whose date is the literal
    // column name.
    if entry.date == "Date" {
        return Ok(());
    }
    let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
        .with_context(|| format!("unreadable date {:?}", entry.date))?;
    // chrono accepts dates within days of the calendar edge whose Monday is
    // not representable. Skip those rows like any other unreadable date.
    let start_date =
        week_start(date).with_context(|| format!("week start out of range for {:?}", entry.date))?;

    let expected_per_week = config.expected_hours_per_week;
    let month = monthly.entry(month_key(date)).or_insert_with(|| {
        // The overall expectation moves in the same four-week step as the
        // month bucket, so both stay in lockstep.
        totals.expected += expected_per_week * 4.0;
        MonthStat {
            worked: 0.0,
            expected: expected_per_week * 4.0,
            vacation_days: 0,
            sick_days: 0,
        }
    });
    let week = weekly.entry(week_key(date)).or_insert_with(|| WeekStat {
        worked: 0.0,
        expected: expected_per_week,
        start_date,
        vacation_days: 0,
        sick_days: 0,
    });

    match entry.classify() {
        EntryKind::Workday => {
            let hours = entry.worked_hours();
            if hours > 0.0 {
                totals.worked += hours;
                month.worked += hours;
                week.worked += hours;
            }
        }
        EntryKind::Vacation => {
            month.vacation_days += 1;
            week.vacation_days += 1;
        }
        EntryKind::Sick => {
            month.sick_days += 1;
            week.sick_days += 1;
        }
        EntryKind::Other => {}
    }
    Ok(())
}

fn render_summary(
    balance: f64,
    totals: &Totals,
    monthly: &BTreeMap<String, MonthStat>,
    weekly: &BTreeMap<String, WeekStat>,
) -> String {
    let mut parts = vec![
        "### Overall Summary".to_string(),
        format!("Total hours worked: {:.2}h", totals.worked),
        format!("Expected hours: {:.2}h", totals.expected),
        format!("Balance: {balance:+.2}h\n"),
        format!(
            "Status: {}\n",
            if balance >= 0.0 {
                "✅ On track"
            } else {
                "⚠️ Behind schedule"
            }
        ),
        "### Weekly Summary\n".to_string(),
        "| Week | Dates | Hours Worked | Expected Hours | Balance | Cumulative Balance |"
            .to_string(),
        "|------|-------|--------------|----------------|---------|-------------------|"
            .to_string(),
    ];

    // Weeks render newest first, and the cumulative column accumulates in
    // that same order. The rendered bytes are part of the document contract,
    // so this stays even though a chronological running total would read more
    // naturally.
    let mut cumulative_balance = 0.0;
    for (week, stats) in weekly.iter().rev() {
        let week_balance = stats.worked - stats.expected;
        cumulative_balance += week_balance;
        let Some(end_date) = stats.start_date.checked_add_days(Days::new(6)) else {
            warn!("Week end out of range for {week}");
            continue;
        };
        parts.push(format!(
            "| {week} | {} to {} | {:.2}h | {:.2}h | {week_balance:+.2}h | {cumulative_balance:+.2}h |",
            format_day(stats.start_date),
            format_day(end_date),
            stats.worked,
            stats.expected,
        ));
    }

    parts.push("\n### Monthly Summary\n".to_string());

    for (month, stats) in monthly {
        let month_balance = stats.worked - stats.expected;
        parts.extend([
            format!("#### {month}"),
            format!("Hours worked: {:.2}h", stats.worked),
            format!("Expected hours: {:.2}h", stats.expected),
            format!("Balance: {month_balance:+.2}h"),
            format!("Vacation days: {}", stats.vacation_days),
            format!("Sick days: {}\n", stats.sick_days),
        ]);
    }

    parts.join("\n")
}
