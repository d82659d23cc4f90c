//! # Kera Core Library
//!
//! Core logic for Kera, a habit tracker. Habits are tracked on chosen
//! weekdays; each month of completions is stored as a single bitmap and the
//! visible day-by-day history is rebuilt from it on every read.
//!
//! ## Architecture
//!
//! - **Date**: UTC calendar days with month arithmetic
//! - **Habit**: lifecycle, weekly schedule, history reconstruction and the
//!   single-day patch protocol
//! - **Storage**: SQLite habit store and TOML-based configuration
//! - **Service**: request-level operations over a store and a clock
//!
//! ## Key Components
//!
//! - [`reconstruct`]: pure month history engine
//! - [`MonthPatch`]: window-checked single-day bitmap edit
//! - [`HabitStore`]: persistence boundary, implemented by [`Database`]
//! - [`HabitService`]: front-end facing operations

pub mod clock;
pub mod date;
pub mod error;
pub mod habit;
pub mod service;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date::Date;
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{
    reconstruct, untracked_history, Day, DayEdit, DayStatus, Habit, HabitStatus, History,
    HistorySummary, MonthPatch, PatchWindow, TrackedWeekDays, WeekDay,
};
pub use service::{DayPatchOutcome, HabitService, HistoryPolicy};
pub use storage::{Config, Database};
pub use store::{HabitStore, HabitTextField};
