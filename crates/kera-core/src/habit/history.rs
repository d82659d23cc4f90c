//! Month history reconstruction.
//!
//! A habit's completions are persisted as one bitmap per month (bit
//! `day - 1` set when that day was marked done). Everything a user sees is
//! derived from that bitmap, the weekly schedule and the lifecycle window by
//! [`reconstruct`]. The function is pure: "today" is always passed in.

use serde::{Deserialize, Serialize};

use super::week_days::TrackedWeekDays;
use crate::date::Date;
use crate::error::ValidationError;

/// Completion state of a single day. Serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum DayStatus {
    Untracked = 0,
    Done = 1,
    Missed = 2,
    Pending = 3,
}

impl TryFrom<u8> for DayStatus {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DayStatus::Untracked),
            1 => Ok(DayStatus::Done),
            2 => Ok(DayStatus::Missed),
            3 => Ok(DayStatus::Pending),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

impl From<DayStatus> for u8 {
    fn from(status: DayStatus) -> Self {
        status as u8
    }
}

/// One entry of a [`History`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub status: DayStatus,
    pub date: Date,
}

/// Per-day statuses for one calendar month, in ascending date order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Day>);

impl History {
    pub fn days(&self) -> &[Day] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Day> {
        self.0.iter()
    }

    pub fn status_on(&self, date: Date) -> Option<DayStatus> {
        self.0.iter().find(|d| d.date == date).map(|d| d.status)
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_history(self)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Day;
    type IntoIter = std::slice::Iter<'a, Day>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Status counts for a month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HistorySummary {
    pub untracked: u32,
    pub done: u32,
    pub missed: u32,
    pub pending: u32,
    /// `done / (done + missed)`, absent when nothing was due yet.
    pub completion_rate: Option<f64>,
}

impl HistorySummary {
    pub fn from_history(history: &History) -> Self {
        let mut summary = Self::default();
        for day in history {
            match day.status {
                DayStatus::Untracked => summary.untracked += 1,
                DayStatus::Done => summary.done += 1,
                DayStatus::Missed => summary.missed += 1,
                DayStatus::Pending => summary.pending += 1,
            }
        }
        let due = summary.done + summary.missed;
        if due > 0 {
            summary.completion_rate = Some(f64::from(summary.done) / f64::from(due));
        }
        summary
    }
}

/// Inputs needed to classify one day.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub date: Date,
    pub bit_set: bool,
    pub tracked: bool,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub today: Date,
}

/// A single step of the classification chain.
pub struct ClassificationRule {
    pub name: &'static str,
    pub applies: fn(&DayContext) -> bool,
    pub status: DayStatus,
}

fn before_start(c: &DayContext) -> bool {
    c.date.before(c.start_date)
}

fn in_future(c: &DayContext) -> bool {
    c.date.after(c.today)
}

fn after_end(c: &DayContext) -> bool {
    c.end_date.is_some_and(|end| c.date.after(end))
}

fn not_scheduled(c: &DayContext) -> bool {
    !c.tracked
}

fn marked_done(c: &DayContext) -> bool {
    c.bit_set
}

fn is_today(c: &DayContext) -> bool {
    c.date == c.today
}

/// Classification chain. The first rule that applies decides the status;
/// a day matching none of them was missed.
///
/// Lifecycle and schedule rules come first so a stray bit outside the
/// habit's window never shows up as done.
pub const CLASSIFICATION_RULES: [ClassificationRule; 6] = [
    ClassificationRule { name: "before_start", applies: before_start, status: DayStatus::Untracked },
    ClassificationRule { name: "in_future", applies: in_future, status: DayStatus::Untracked },
    ClassificationRule { name: "after_end", applies: after_end, status: DayStatus::Untracked },
    ClassificationRule { name: "not_scheduled", applies: not_scheduled, status: DayStatus::Untracked },
    ClassificationRule { name: "marked_done", applies: marked_done, status: DayStatus::Done },
    ClassificationRule { name: "is_today", applies: is_today, status: DayStatus::Pending },
];

/// Status of one day under [`CLASSIFICATION_RULES`].
pub fn classify(ctx: &DayContext) -> DayStatus {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.applies)(ctx))
        .map_or(DayStatus::Missed, |rule| rule.status)
}

/// Rebuild the history of the month containing `month_anchor`.
///
/// `bitmap` bit `i` corresponds to day `i + 1`; bits past the end of the
/// month are ignored.
pub fn reconstruct(
    month_anchor: Date,
    bitmap: u32,
    schedule: &TrackedWeekDays,
    start_date: Date,
    end_date: Option<Date>,
    today: Date,
) -> History {
    let first = month_anchor.first_of_month();
    let days = month_anchor.days_in_month();

    let history = (0..days)
        .map(|i| {
            let date = first.add_days(i64::from(i));
            let ctx = DayContext {
                date,
                bit_set: (bitmap >> i) & 1 == 1,
                tracked: schedule.tracks(date),
                start_date,
                end_date,
                today,
            };
            Day {
                status: classify(&ctx),
                date,
            }
        })
        .collect();

    History(history)
}

/// A month where every day is untracked.
pub fn untracked_history(month_anchor: Date) -> History {
    let first = month_anchor.first_of_month();
    let history = (0..month_anchor.days_in_month())
        .map(|i| Day {
            status: DayStatus::Untracked,
            date: first.add_days(i64::from(i)),
        })
        .collect();
    History(history)
}

/// Whether any day of the month can be classified as something other than
/// untracked, given the habit's lifecycle window and today.
pub fn window_overlaps_month(
    month_anchor: Date,
    start_date: Date,
    end_date: Option<Date>,
    today: Date,
) -> bool {
    let visible_end = match end_date {
        Some(end) if end.before(today) => end,
        _ => today,
    };
    if visible_end.before(start_date) {
        return false;
    }
    !start_date.after(month_anchor.last_of_month()) && !visible_end.before(month_anchor.first_of_month())
}

/// History for a month whose bitmap row may be missing.
///
/// A missing row means no day was ever marked done, which is not the same as
/// untracked: an active habit with no completions still has missed and
/// pending days. The untracked shortcut is taken only when the lifecycle
/// window does not reach into the month, where both paths agree.
pub fn month_history(
    month_anchor: Date,
    bitmap: Option<u32>,
    schedule: &TrackedWeekDays,
    start_date: Date,
    end_date: Option<Date>,
    today: Date,
) -> History {
    if !window_overlaps_month(month_anchor, start_date, end_date, today) {
        tracing::debug!(month = %month_anchor.first_of_month(), "lifecycle outside month, untracked");
        return untracked_history(month_anchor);
    }
    reconstruct(
        month_anchor,
        bitmap.unwrap_or(0),
        schedule,
        start_date,
        end_date,
        today,
    )
}
