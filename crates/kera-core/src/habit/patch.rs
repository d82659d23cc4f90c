//! Single-day edits to a month bitmap.
//!
//! A day may only be edited while it lies in the trailing patch window:
//! `0 <= today - date <= window`. The edit itself is planned here and
//! carried out by the store in one atomic statement.

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::error::ValidationError;

/// Days in the past that can still be edited.
pub const DEFAULT_PATCH_WINDOW_DAYS: u32 = 7;

/// Trailing span of editable days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchWindow {
    days: u32,
}

impl Default for PatchWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PATCH_WINDOW_DAYS)
    }
}

impl PatchWindow {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn contains(&self, date: Date, today: Date) -> bool {
        let age = today.days_since(date);
        (0..=i64::from(self.days)).contains(&age)
    }

    /// # Errors
    /// [`ValidationError::OutOfWindow`] for future dates and dates older
    /// than the window.
    pub fn check(&self, date: Date, today: Date) -> Result<(), ValidationError> {
        if self.contains(date, today) {
            Ok(())
        } else {
            Err(ValidationError::OutOfWindow {
                date,
                window_days: self.days,
            })
        }
    }
}

/// How a single day's bit changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayEdit {
    /// Flip the bit. Applying twice restores the previous value, so a
    /// retried request undoes itself.
    Toggle,
    /// Force the bit to the given value. Safe to retry.
    Set(bool),
}

impl DayEdit {
    /// New bitmap after applying the edit; `None` is an absent row.
    pub fn apply(self, existing: Option<u32>, bit: u32) -> u32 {
        let current = existing.unwrap_or(0);
        match self {
            DayEdit::Toggle => current ^ bit,
            DayEdit::Set(true) => current | bit,
            DayEdit::Set(false) => current & !bit,
        }
    }
}

/// A validated edit against one (habit, month) bitmap row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPatch {
    /// First day of the month; the row key.
    pub month: Date,
    /// The single bit for the edited day.
    pub bit: u32,
    pub edit: DayEdit,
}

/// Bit of `date` within its month bitmap.
pub fn day_bit(date: Date) -> u32 {
    1 << (date.day() - 1)
}

impl MonthPatch {
    /// Check the window and build the patch. Nothing is written when this
    /// fails.
    ///
    /// # Errors
    /// [`ValidationError::OutOfWindow`] from [`PatchWindow::check`].
    pub fn plan(
        date: Date,
        edit: DayEdit,
        today: Date,
        window: PatchWindow,
    ) -> Result<Self, ValidationError> {
        window.check(date, today)?;
        Ok(Self {
            month: date.first_of_month(),
            bit: day_bit(date),
            edit,
        })
    }
}
