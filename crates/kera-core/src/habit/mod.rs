//! Habits and their lifecycle.
//!
//! A habit is created active, starting on the day it was created, and can be
//! ended once. Its weekly schedule and lifecycle dates bound which days of
//! its history are ever classified as done, missed or pending.

pub mod history;
pub mod patch;
pub mod week_days;

pub use history::{
    month_history, reconstruct, untracked_history, Day, DayStatus, History, HistorySummary,
};
pub use patch::{day_bit, DayEdit, MonthPatch, PatchWindow, DEFAULT_PATCH_WINDOW_DAYS};
pub use week_days::{TrackedWeekDays, WeekDay};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date::Date;
use crate::error::ValidationError;

const TITLE_MIN_CHARS: usize = 2;
const TITLE_MAX_CHARS: usize = 64;
const DESCRIPTION_MAX_CHARS: usize = 256;

/// Lifecycle status of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    Active,
    Ended,
}

impl HabitStatus {
    pub fn code(self) -> u8 {
        match self {
            HabitStatus::Active => 0,
            HabitStatus::Ended => 1,
        }
    }

    /// # Errors
    /// [`ValidationError::InvalidStatus`] for anything but 0 or 1.
    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(HabitStatus::Active),
            1 => Ok(HabitStatus::Ended),
            _ => Err(ValidationError::InvalidStatus),
        }
    }
}

/// A user's habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub status: HabitStatus,
    pub title: String,
    pub description: String,
    pub week_days: TrackedWeekDays,
    pub start_date: Date,
    /// Set when the habit ends; absent while active.
    pub end_date: Option<Date>,
}

impl Habit {
    /// Create an active habit starting `today`.
    ///
    /// # Errors
    /// Title, description or schedule validation errors.
    pub fn new(
        title: &str,
        description: &str,
        week_days: &[WeekDay],
        today: Date,
    ) -> Result<Self, ValidationError> {
        validate_title(title)?;
        validate_description(description)?;
        let week_days = TrackedWeekDays::from_week_days(week_days)?;

        Ok(Self {
            id: Uuid::now_v7(),
            status: HabitStatus::Active,
            title: title.to_string(),
            description: description.to_string(),
            week_days,
            start_date: today,
            end_date: None,
        })
    }

    /// Rebuild a habit from stored fields.
    ///
    /// # Errors
    /// Any validation error of the stored values.
    pub fn load(
        id: Uuid,
        status_code: u8,
        title: String,
        description: String,
        week_days_bits: u8,
        start_date: Date,
        end_date: Option<Date>,
    ) -> Result<Self, ValidationError> {
        let status = HabitStatus::from_code(status_code)?;
        validate_title(&title)?;
        validate_description(&description)?;
        let week_days = TrackedWeekDays::from_bits(week_days_bits)?;

        Ok(Self {
            id,
            status,
            title,
            description,
            week_days,
            start_date,
            end_date,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == HabitStatus::Active
    }

    /// End the habit on `today`. Returns false, changing nothing, when it
    /// has already ended.
    pub fn end(&mut self, today: Date) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = HabitStatus::Ended;
        self.end_date = Some(today);
        true
    }

    /// History for the month containing `month_anchor`; `bitmap` is `None`
    /// when no day of that month was ever marked.
    pub fn month_history(&self, month_anchor: Date, bitmap: Option<u32>, today: Date) -> History {
        history::month_history(
            month_anchor,
            bitmap,
            &self.week_days,
            self.start_date,
            self.end_date,
            today,
        )
    }
}

fn is_forbidden_char(c: char) -> bool {
    c.is_control() || (c.is_whitespace() && c != ' ')
}

/// # Errors
/// Too short, too long, or containing control characters, non-space
/// whitespace, or leading/trailing spaces.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    // Avoid counting chars of huge inputs.
    if title.len() > TITLE_MAX_CHARS * 4 {
        return Err(ValidationError::TitleTooLong);
    }

    let length = title.chars().count();
    if length < TITLE_MIN_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    if length > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    if title.chars().any(is_forbidden_char) {
        return Err(ValidationError::TitleInvalid);
    }

    let spaces = title.chars().filter(|c| *c == ' ').count();
    if length - spaces < TITLE_MIN_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    if title.starts_with(' ') || title.ends_with(' ') {
        return Err(ValidationError::TitleInvalid);
    }
    Ok(())
}

/// # Errors
/// Too long or containing control characters or non-space whitespace.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.len() > DESCRIPTION_MAX_CHARS * 4 {
        return Err(ValidationError::DescriptionTooLong);
    }
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    if description.chars().any(is_forbidden_char) {
        return Err(ValidationError::DescriptionInvalid);
    }
    Ok(())
}
