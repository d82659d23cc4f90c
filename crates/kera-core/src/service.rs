//! Habit operations as seen by a front end.
//!
//! [`HabitService`] ties a [`HabitStore`] to a [`Clock`] and the history
//! policy. Inputs arrive as raw request values (ISO date strings, year and
//! month numbers) and are validated here before any storage call.

use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::date::{self, Date, MIN_YEAR};
use crate::error::{CoreError, Result};
use crate::habit::{
    validate_description, validate_title, DayEdit, Habit, History, MonthPatch, PatchWindow,
    WeekDay,
};
use crate::store::{HabitStore, HabitTextField};

/// Result of a single-day edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayPatchOutcome {
    pub date: Date,
    /// Whether the day is now marked done.
    pub done: bool,
    /// The month bitmap after the edit.
    pub bitmap: u32,
}

/// History policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct HistoryPolicy {
    pub patch_window: PatchWindow,
    pub min_year: i32,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self {
            patch_window: PatchWindow::default(),
            min_year: MIN_YEAR,
        }
    }
}

fn log_failure(err: CoreError) -> CoreError {
    if !err.is_client_safe() {
        tracing::error!("habit store failure: {err}");
    }
    err
}

pub struct HabitService<S, C> {
    store: S,
    clock: C,
    policy: HistoryPolicy,
}

impl<S: HabitStore, C: Clock> HabitService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_policy(store, clock, HistoryPolicy::default())
    }

    pub fn with_policy(store: S, clock: C, policy: HistoryPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// # Errors
    /// Validation errors for the inputs, or a storage failure.
    pub fn create_habit(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
        week_days: &[WeekDay],
    ) -> Result<Habit> {
        let habit = Habit::new(title, description, week_days, self.today())?;
        self.store.create_habit(&habit, user_id).map_err(log_failure)?;
        tracing::info!(habit = %habit.id, "habit created");
        Ok(habit)
    }

    /// # Errors
    /// Storage failure.
    pub fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        self.store.list_habits(user_id).map_err(log_failure)
    }

    /// # Errors
    /// [`CoreError::HabitNotFound`] or a storage failure.
    pub fn get_habit(&self, user_id: &str, habit_id: Uuid) -> Result<Habit> {
        self.store.load_habit(habit_id, user_id).map_err(log_failure)
    }

    /// # Errors
    /// Title validation, [`CoreError::HabitNotFound`] or a storage failure.
    pub fn rename_habit(&self, user_id: &str, habit_id: Uuid, title: &str) -> Result<()> {
        validate_title(title)?;
        self.store
            .update_habit_text(habit_id, HabitTextField::Title, title, user_id)
            .map_err(log_failure)
    }

    /// # Errors
    /// Description validation, [`CoreError::HabitNotFound`] or a storage failure.
    pub fn describe_habit(&self, user_id: &str, habit_id: Uuid, description: &str) -> Result<()> {
        validate_description(description)?;
        self.store
            .update_habit_text(habit_id, HabitTextField::Description, description, user_id)
            .map_err(log_failure)
    }

    /// End the habit today. Returns false if it had already ended.
    ///
    /// # Errors
    /// [`CoreError::HabitNotFound`] or a storage failure.
    pub fn end_habit(&self, user_id: &str, habit_id: Uuid) -> Result<bool> {
        let ended = self
            .store
            .end_habit(habit_id, self.today(), user_id)
            .map_err(log_failure)?;
        if ended {
            tracing::info!(habit = %habit_id, "habit ended");
        } else {
            tracing::debug!(habit = %habit_id, "habit already ended");
        }
        Ok(ended)
    }

    /// # Errors
    /// [`CoreError::HabitNotFound`] or a storage failure.
    pub fn delete_habit(&self, user_id: &str, habit_id: Uuid) -> Result<()> {
        self.store.delete_habit(habit_id, user_id).map_err(log_failure)?;
        tracing::info!(habit = %habit_id, "habit deleted");
        Ok(())
    }

    /// Day-by-day history of one month.
    ///
    /// # Errors
    /// Year/month validation, [`CoreError::HabitNotFound`] or a storage
    /// failure.
    pub fn month_history(
        &self,
        user_id: &str,
        habit_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<History> {
        let today = self.today();
        let anchor = date::month_anchor(year, month, today, self.policy.min_year)?;
        let habit = self.get_habit(user_id, habit_id)?;
        let bitmap = self
            .store
            .load_month_bitmap(habit_id, anchor)
            .map_err(log_failure)?;
        tracing::debug!(habit = %habit_id, month = %anchor, ?bitmap, "reconstructing history");
        Ok(habit.month_history(anchor, bitmap, today))
    }

    /// Flip the done mark of `date` (ISO `YYYY-MM-DD`).
    ///
    /// # Errors
    /// [`ValidationError::InvalidDate`](crate::error::ValidationError::InvalidDate),
    /// [`ValidationError::OutOfWindow`](crate::error::ValidationError::OutOfWindow),
    /// [`CoreError::HabitNotFound`] or a storage failure.
    pub fn toggle_day(&self, user_id: &str, habit_id: Uuid, date: &str) -> Result<DayPatchOutcome> {
        self.patch_day(user_id, habit_id, date, DayEdit::Toggle)
    }

    /// Mark `date` as done or not done; repeating the call changes nothing.
    ///
    /// # Errors
    /// Same as [`HabitService::toggle_day`].
    pub fn set_day(
        &self,
        user_id: &str,
        habit_id: Uuid,
        date: &str,
        done: bool,
    ) -> Result<DayPatchOutcome> {
        self.patch_day(user_id, habit_id, date, DayEdit::Set(done))
    }

    fn patch_day(
        &self,
        user_id: &str,
        habit_id: Uuid,
        date: &str,
        edit: DayEdit,
    ) -> Result<DayPatchOutcome> {
        let date = Date::parse_iso(date)?;
        let patch = MonthPatch::plan(date, edit, self.today(), self.policy.patch_window)?;
        let bitmap = self
            .store
            .apply_month_patch(habit_id, &patch, user_id)
            .map_err(log_failure)?;
        let done = bitmap & patch.bit != 0;
        tracing::debug!(habit = %habit_id, %date, ?edit, done, "day patched");
        Ok(DayPatchOutcome { date, done, bitmap })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ValidationError;
    use crate::habit::DayStatus;
    use crate::storage::Database;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn service(today: Date) -> HabitService<Database, FixedClock> {
        HabitService::new(Database::open_memory().unwrap(), FixedClock(today))
    }

    #[test]
    fn toggle_twice_restores_baseline() {
        let svc = service(d(2024, 7, 20));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();

        let first = svc.toggle_day("u", habit.id, "2024-07-15").unwrap();
        assert!(first.done);
        assert_eq!(first.bitmap, 1 << 14);
        let second = svc.toggle_day("u", habit.id, "2024-07-15").unwrap();
        assert!(!second.done);
        assert_eq!(second.bitmap, 0);
    }

    #[test]
    fn out_of_window_writes_nothing() {
        let svc = service(d(2024, 7, 25));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();

        let err = svc.toggle_day("u", habit.id, "2024-07-15").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfWindow { window_days: 7, .. })
        ));
        assert!(svc.toggle_day("u", habit.id, "2024-07-26").is_err());
        assert_eq!(svc.store().load_month_bitmap(habit.id, d(2024, 7, 1)).unwrap(), None);
    }

    #[test]
    fn bad_date_string_is_validation_error() {
        let svc = service(d(2024, 7, 25));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();
        for date in ["July 20", "2024-7-20", "+2024-07-20", " 2024-07-20"] {
            assert!(matches!(
                svc.toggle_day("u", habit.id, date),
                Err(CoreError::Validation(ValidationError::InvalidDate))
            ));
        }
        assert_eq!(svc.store().load_month_bitmap(habit.id, d(2024, 7, 1)).unwrap(), None);
    }

    #[test]
    fn history_without_row_reports_missed_and_pending() {
        let svc = service(d(2024, 7, 3));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();

        let history = svc.month_history("u", habit.id, 2024, 7).unwrap();
        assert_eq!(history.len(), 31);
        assert_eq!(history.status_on(d(2024, 7, 3)), Some(DayStatus::Pending));
        assert_eq!(history.status_on(d(2024, 7, 4)), Some(DayStatus::Untracked));

        let svc = HabitService::new(
            Database::open_memory().unwrap(),
            FixedClock(d(2024, 7, 10)),
        );
        let habit = Habit::new("Stretch", "", &WeekDay::ALL, d(2024, 7, 1)).unwrap();
        svc.store().create_habit(&habit, "u").unwrap();
        let history = svc.month_history("u", habit.id, 2024, 7).unwrap();
        assert_eq!(history.status_on(d(2024, 7, 1)), Some(DayStatus::Missed));
    }

    #[test]
    fn history_validates_year_and_month() {
        let svc = service(d(2024, 7, 3));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();
        assert!(matches!(
            svc.month_history("u", habit.id, 2023, 7),
            Err(CoreError::Validation(ValidationError::InvalidYear))
        ));
        assert!(matches!(
            svc.month_history("u", habit.id, 2026, 7),
            Err(CoreError::Validation(ValidationError::InvalidYear))
        ));
        assert!(matches!(
            svc.month_history("u", habit.id, 2024, 13),
            Err(CoreError::Validation(ValidationError::InvalidMonth))
        ));
        assert!(svc.month_history("u", habit.id, 2025, 1).is_ok());
    }

    #[test]
    fn ended_habit_stops_counting() {
        let svc = service(d(2024, 7, 10));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();
        assert!(svc.end_habit("u", habit.id).unwrap());
        assert!(!svc.end_habit("u", habit.id).unwrap());

        let history = svc.month_history("u", habit.id, 2024, 7).unwrap();
        assert_eq!(history.status_on(d(2024, 7, 10)), Some(DayStatus::Pending));
        assert_eq!(history.status_on(d(2024, 7, 9)), Some(DayStatus::Untracked));
    }

    #[test]
    fn rename_validates_before_writing() {
        let svc = service(d(2024, 7, 10));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();
        assert!(matches!(
            svc.rename_habit("u", habit.id, " x"),
            Err(CoreError::Validation(_))
        ));
        svc.rename_habit("u", habit.id, "Yoga").unwrap();
        svc.describe_habit("u", habit.id, "20 minutes").unwrap();
        let loaded = svc.get_habit("u", habit.id).unwrap();
        assert_eq!(loaded.title, "Yoga");
        assert_eq!(loaded.description, "20 minutes");
    }

    #[test]
    fn set_day_converges_under_retries() {
        let svc = service(d(2024, 7, 10));
        let habit = svc.create_habit("u", "Stretch", "", &WeekDay::ALL).unwrap();
        let a = svc.set_day("u", habit.id, "2024-07-09", true).unwrap();
        let b = svc.set_day("u", habit.id, "2024-07-09", true).unwrap();
        assert_eq!(a, b);
        assert!(b.done);
    }
}
