pub mod config;
pub mod habit;
pub mod history;

use kera_core::{Config, CoreError, Database, HabitService, SystemClock};
use serde::Serialize;
use uuid::Uuid;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Service bound to the configured database and account.
pub struct Session {
    pub service: HabitService<Database, SystemClock>,
    pub user_id: String,
}

impl Session {
    pub fn open() -> Result<Self, CoreError> {
        Self::connect().inspect_err(|e| tracing::error!("failed to open session: {e}"))
    }

    fn connect() -> Result<Self, CoreError> {
        let config = Config::load()?;
        let db = Database::open_at(&config.database_path()?)?;
        Ok(Self {
            service: HabitService::with_policy(db, SystemClock, config.history_policy()),
            user_id: config.account.user_id,
        })
    }
}

pub fn parse_habit_id(id: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    Uuid::parse_str(id.trim()).map_err(|_| format!("invalid habit id: {id}").into())
}

pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
