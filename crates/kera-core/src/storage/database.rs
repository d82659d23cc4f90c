//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habits, keyed by id and owned by a user id
//! - Monthly completion bitmaps, one row per (habit, month)

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::migrations;
use crate::date::Date;
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{DayEdit, Habit, MonthPatch};
use crate::store::{HabitStore, HabitTextField};

/// Raw column values of a `habits` row.
struct HabitRow {
    id: String,
    status: i64,
    title: String,
    description: String,
    tracked_week_days: i64,
    start_date: String,
    end_date: Option<String>,
}

fn corrupt(message: impl ToString) -> CoreError {
    DatabaseError::CorruptRow {
        table: "habits",
        message: message.to_string(),
    }
    .into()
}

fn read_habit_row(row: &rusqlite::Row) -> rusqlite::Result<HabitRow> {
    Ok(HabitRow {
        id: row.get(0)?,
        status: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        tracked_week_days: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}

impl HabitRow {
    fn into_habit(self) -> Result<Habit> {
        let id = Uuid::parse_str(&self.id).map_err(corrupt)?;
        let status = u8::try_from(self.status).map_err(corrupt)?;
        let week_days = u8::try_from(self.tracked_week_days).map_err(corrupt)?;
        let start_date = Date::parse_iso(&self.start_date).map_err(corrupt)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(Date::parse_iso)
            .transpose()
            .map_err(corrupt)?;

        Habit::load(
            id,
            status,
            self.title,
            self.description,
            week_days,
            start_date,
            end_date,
        )
        .map_err(|e| corrupt(format!("habit {id}: {e}")))
    }
}

const HABIT_COLUMNS: &str =
    "id, status, title, description, tracked_week_days, start_date, end_date";

/// SQLite database for habits and their history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (creating if needed) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn habit_exists(&self, habit_id: Uuid, user_id: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM habits WHERE id = ?1 AND user_id = ?2",
                params![habit_id.to_string(), user_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl HabitStore for Database {
    fn create_habit(&self, habit: &Habit, user_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO habits (id, user_id, status, title, description,
                                 tracked_week_days, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                habit.id.to_string(),
                user_id,
                habit.status.code(),
                habit.title,
                habit.description,
                habit.week_days.bits(),
                habit.start_date.to_string(),
                habit.end_date.map(|d| d.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn list_habits(&self, user_id: &str) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits
             WHERE user_id = ?1
             ORDER BY created_at, id"
        ))?;
        let rows = stmt.query_map(params![user_id], read_habit_row)?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?.into_habit()?);
        }
        Ok(habits)
    }

    fn load_habit(&self, habit_id: Uuid, user_id: &str) -> Result<Habit> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1 AND user_id = ?2"),
                params![habit_id.to_string(), user_id],
                read_habit_row,
            )
            .optional()?;
        row.ok_or(CoreError::HabitNotFound)?.into_habit()
    }

    fn update_habit_text(
        &self,
        habit_id: Uuid,
        field: HabitTextField,
        value: &str,
        user_id: &str,
    ) -> Result<()> {
        let sql = match field {
            HabitTextField::Title => "UPDATE habits SET title = ?1 WHERE id = ?2 AND user_id = ?3",
            HabitTextField::Description => {
                "UPDATE habits SET description = ?1 WHERE id = ?2 AND user_id = ?3"
            }
        };
        let changed = self
            .conn
            .execute(sql, params![value, habit_id.to_string(), user_id])?;
        if changed == 0 {
            return Err(CoreError::HabitNotFound);
        }
        Ok(())
    }

    fn delete_habit(&self, habit_id: Uuid, user_id: &str) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit_id.to_string(), user_id],
        )?;
        if changed == 0 {
            return Err(CoreError::HabitNotFound);
        }
        Ok(())
    }

    fn end_habit(&self, habit_id: Uuid, today: Date, user_id: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE habits SET status = 1, end_date = ?1
             WHERE id = ?2 AND user_id = ?3 AND status = 0",
            params![today.to_string(), habit_id.to_string(), user_id],
        )?;
        if changed > 0 {
            return Ok(true);
        }
        if self.habit_exists(habit_id, user_id)? {
            Ok(false)
        } else {
            Err(CoreError::HabitNotFound)
        }
    }

    fn load_month_bitmap(&self, habit_id: Uuid, month: Date) -> Result<Option<u32>> {
        let days = self
            .conn
            .query_row(
                "SELECT days FROM habit_histories WHERE habit_id = ?1 AND month = ?2",
                params![habit_id.to_string(), month.first_of_month().to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        days.map(|d| {
            u32::try_from(d).map_err(|e| {
                CoreError::from(DatabaseError::CorruptRow {
                    table: "habit_histories",
                    message: e.to_string(),
                })
            })
        })
        .transpose()
    }

    fn apply_month_patch(&self, habit_id: Uuid, patch: &MonthPatch, user_id: &str) -> Result<u32> {
        // SQLite has no XOR operator: a ^ b == (a | b) - (a & b).
        let update = match patch.edit {
            DayEdit::Toggle => "(days | ?5) - (days & ?5)",
            DayEdit::Set(true) => "days | ?5",
            DayEdit::Set(false) => "days & ~?5",
        };
        // The SELECT's WHERE clause both checks ownership and keeps the
        // upsert unambiguous for SQLite's parser.
        let sql = format!(
            "INSERT INTO habit_histories (habit_id, month, days)
             SELECT ?1, ?2, ?3
             WHERE EXISTS (SELECT 1 FROM habits WHERE id = ?1 AND user_id = ?4)
             ON CONFLICT (habit_id, month) DO UPDATE SET days = {update}
             RETURNING days"
        );

        let initial = patch.edit.apply(None, patch.bit);
        let days = self
            .conn
            .query_row(
                &sql,
                params![
                    habit_id.to_string(),
                    patch.month.to_string(),
                    i64::from(initial),
                    user_id,
                    i64::from(patch.bit),
                ],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(CoreError::HabitNotFound)?;

        u32::try_from(days).map_err(|e| {
            DatabaseError::CorruptRow {
                table: "habit_histories",
                message: e.to_string(),
            }
            .into()
        })
    }
}
