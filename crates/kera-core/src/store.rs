//! Persistence boundary for habits and their month bitmaps.
//!
//! Every call that names a habit also names the requesting user. Stores must
//! treat a habit owned by someone else exactly like a missing one and report
//! [`CoreError::HabitNotFound`](crate::error::CoreError::HabitNotFound).

use uuid::Uuid;

use crate::date::Date;
use crate::error::Result;
use crate::habit::{Habit, MonthPatch};

/// Editable text fields of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitTextField {
    Title,
    Description,
}

pub trait HabitStore {
    fn create_habit(&self, habit: &Habit, user_id: &str) -> Result<()>;

    /// All habits of a user, oldest first.
    fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>>;

    fn load_habit(&self, habit_id: Uuid, user_id: &str) -> Result<Habit>;

    /// Caller validates `value` first.
    fn update_habit_text(
        &self,
        habit_id: Uuid,
        field: HabitTextField,
        value: &str,
        user_id: &str,
    ) -> Result<()>;

    fn delete_habit(&self, habit_id: Uuid, user_id: &str) -> Result<()>;

    /// Move an active habit to ended on `today`. Returns false when the habit
    /// had already ended.
    fn end_habit(&self, habit_id: Uuid, today: Date, user_id: &str) -> Result<bool>;

    /// Bitmap of the month starting at `month`, `None` if no row exists.
    fn load_month_bitmap(&self, habit_id: Uuid, month: Date) -> Result<Option<u32>>;

    /// Apply `patch` in a single atomic read-modify-write and return the new
    /// bitmap.
    fn apply_month_patch(&self, habit_id: Uuid, patch: &MonthPatch, user_id: &str) -> Result<u32>;
}
