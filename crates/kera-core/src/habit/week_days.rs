//! Weekly tracking schedule.
//!
//! The schedule is stored as one flag per weekday. The compact 7-bit
//! encoding (bit `i` set for weekday `i`, Monday first) only exists at the
//! storage boundary via [`TrackedWeekDays::bits`] and
//! [`TrackedWeekDays::from_bits`].

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::error::ValidationError;

/// A day of the week, Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum WeekDay {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn of(date: Date) -> Self {
        Self::ALL[usize::from(date.weekday_index())]
    }

    pub fn short_name(self) -> &'static str {
        match self {
            WeekDay::Monday => "mon",
            WeekDay::Tuesday => "tue",
            WeekDay::Wednesday => "wed",
            WeekDay::Thursday => "thu",
            WeekDay::Friday => "fri",
            WeekDay::Saturday => "sat",
            WeekDay::Sunday => "sun",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
        }
    }

    /// Parse `mon`, `monday`, `Mon` and friends.
    pub fn parse_name(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| lower == day.short_name() || lower == day.name())
    }
}

impl TryFrom<u8> for WeekDay {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ValidationError::InvalidSchedule)
    }
}

impl From<WeekDay> for u8 {
    fn from(day: WeekDay) -> Self {
        day as u8
    }
}

/// The set of weekdays a habit is tracked on. Never empty once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeekDay>", into = "Vec<WeekDay>")]
pub struct TrackedWeekDays {
    days: [bool; 7],
}

impl TrackedWeekDays {
    /// Every day of the week.
    pub const EVERY_DAY: TrackedWeekDays = TrackedWeekDays { days: [true; 7] };

    /// Monday through Friday.
    pub const WEEKDAYS: TrackedWeekDays = TrackedWeekDays {
        days: [true, true, true, true, true, false, false],
    };

    /// Check a raw 7-bit mask.
    ///
    /// # Errors
    /// [`ValidationError::EmptySchedule`] for zero,
    /// [`ValidationError::InvalidSchedule`] when any bit above 6 is set.
    pub fn validate(mask: u8) -> Result<(), ValidationError> {
        if mask == 0 {
            return Err(ValidationError::EmptySchedule);
        }
        if mask >= 1 << 7 {
            return Err(ValidationError::InvalidSchedule);
        }
        Ok(())
    }

    /// Decode the storage encoding.
    ///
    /// # Errors
    /// Same as [`TrackedWeekDays::validate`].
    pub fn from_bits(mask: u8) -> Result<Self, ValidationError> {
        Self::validate(mask)?;
        let mut days = [false; 7];
        for (i, flag) in days.iter_mut().enumerate() {
            *flag = (mask >> i) & 1 == 1;
        }
        Ok(Self { days })
    }

    /// Build a schedule from a list of days. Duplicates are harmless.
    ///
    /// # Errors
    /// [`ValidationError::EmptySchedule`] when `days` is empty.
    pub fn from_week_days(days: &[WeekDay]) -> Result<Self, ValidationError> {
        let mask = days.iter().fold(0u8, |mask, day| mask | (1 << day.index()));
        Self::from_bits(mask)
    }

    /// Storage encoding, Monday in the least significant bit.
    pub fn bits(&self) -> u8 {
        self.days
            .iter()
            .enumerate()
            .filter(|(_, tracked)| **tracked)
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    pub fn contains(&self, day: WeekDay) -> bool {
        self.days[day.index()]
    }

    pub fn tracks(&self, date: Date) -> bool {
        self.contains(WeekDay::of(date))
    }

    /// Tracked days in Monday-to-Sunday order.
    pub fn to_week_days(&self) -> Vec<WeekDay> {
        WeekDay::ALL
            .into_iter()
            .filter(|day| self.contains(*day))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.days.iter().filter(|tracked| **tracked).count()
    }

    /// Always false for a constructed value; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<Vec<WeekDay>> for TrackedWeekDays {
    type Error = ValidationError;

    fn try_from(days: Vec<WeekDay>) -> Result<Self, Self::Error> {
        Self::from_week_days(&days)
    }
}

impl From<TrackedWeekDays> for Vec<WeekDay> {
    fn from(days: TrackedWeekDays) -> Self {
        days.to_week_days()
    }
}
