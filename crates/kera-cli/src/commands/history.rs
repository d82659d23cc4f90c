//! Month history and day marking commands for CLI.

use clap::{ArgGroup, Subcommand};
use kera_core::{History, HistorySummary};
use serde::Serialize;
use uuid::Uuid;

use super::{parse_habit_id, print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Show one month of a habit's history
    Show {
        /// Habit ID
        id: String,
        /// Year (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current month)
        #[arg(long)]
        month: Option<u32>,
        /// Print per-status counts instead of the day list
        #[arg(long)]
        summary: bool,
    },
    /// Flip the done mark of a day
    Toggle {
        /// Habit ID
        id: String,
        /// Day as YYYY-MM-DD
        date: String,
    },
    /// Mark a day done or not done
    #[command(group(ArgGroup::new("mark").required(true).args(["done", "undone"])))]
    Set {
        /// Habit ID
        id: String,
        /// Day as YYYY-MM-DD
        date: String,
        #[arg(long)]
        done: bool,
        #[arg(long)]
        undone: bool,
    },
}

#[derive(Serialize)]
struct MonthReport {
    habit_id: Uuid,
    year: i32,
    month: u32,
    days: History,
}

#[derive(Serialize)]
struct MonthSummary {
    habit_id: Uuid,
    year: i32,
    month: u32,
    #[serde(flatten)]
    summary: HistorySummary,
}

pub fn run(action: HistoryAction) -> CommandResult {
    let session = Session::open()?;
    let svc = &session.service;
    let user = session.user_id.as_str();

    match action {
        HistoryAction::Show {
            id,
            year,
            month,
            summary,
        } => {
            let habit_id = parse_habit_id(&id)?;
            let today = svc.today();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let days = svc.month_history(user, habit_id, year, month)?;
            if summary {
                print_json(&MonthSummary {
                    habit_id,
                    year,
                    month,
                    summary: days.summary(),
                })?;
            } else {
                print_json(&MonthReport {
                    habit_id,
                    year,
                    month,
                    days,
                })?;
            }
        }
        HistoryAction::Toggle { id, date } => {
            let outcome = svc.toggle_day(user, parse_habit_id(&id)?, &date)?;
            print_json(&outcome)?;
        }
        HistoryAction::Set {
            id,
            date,
            done,
            undone: _,
        } => {
            let outcome = svc.set_day(user, parse_habit_id(&id)?, &date, done)?;
            print_json(&outcome)?;
        }
    }
    Ok(())
}
