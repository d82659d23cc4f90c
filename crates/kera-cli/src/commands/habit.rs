//! Habit management commands for CLI.

use clap::Subcommand;
use kera_core::WeekDay;

use super::{parse_habit_id, print_json, CommandResult, Session};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit starting today
    Create {
        /// Habit title
        title: String,
        /// Habit description
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated weekdays to track, e.g. "mon,wed,fri" (default: every day)
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,
    },
    /// List habits
    List,
    /// Get habit details
    Show {
        /// Habit ID
        id: String,
    },
    /// Change the title of a habit
    Rename {
        /// Habit ID
        id: String,
        /// New title
        title: String,
    },
    /// Change the description of a habit
    Describe {
        /// Habit ID
        id: String,
        /// New description
        description: String,
    },
    /// End a habit today
    End {
        /// Habit ID
        id: String,
    },
    /// Delete a habit and its history
    Delete {
        /// Habit ID
        id: String,
    },
}

fn parse_days(days: &[String]) -> Result<Vec<WeekDay>, String> {
    if days.is_empty() {
        return Ok(WeekDay::ALL.to_vec());
    }
    days.iter()
        .map(|s| WeekDay::parse_name(s).ok_or_else(|| format!("unknown weekday: {s}")))
        .collect()
}

pub fn run(action: HabitAction) -> CommandResult {
    let session = Session::open()?;
    let svc = &session.service;
    let user = session.user_id.as_str();

    match action {
        HabitAction::Create {
            title,
            description,
            days,
        } => {
            let week_days = parse_days(&days)?;
            let habit = svc.create_habit(user, &title, &description, &week_days)?;
            print_json(&habit)?;
        }
        HabitAction::List => {
            print_json(&svc.list_habits(user)?)?;
        }
        HabitAction::Show { id } => {
            print_json(&svc.get_habit(user, parse_habit_id(&id)?)?)?;
        }
        HabitAction::Rename { id, title } => {
            let id = parse_habit_id(&id)?;
            svc.rename_habit(user, id, &title)?;
            print_json(&svc.get_habit(user, id)?)?;
        }
        HabitAction::Describe { id, description } => {
            let id = parse_habit_id(&id)?;
            svc.describe_habit(user, id, &description)?;
            print_json(&svc.get_habit(user, id)?)?;
        }
        HabitAction::End { id } => {
            let id = parse_habit_id(&id)?;
            let ended = svc.end_habit(user, id)?;
            if !ended {
                eprintln!("habit {id} had already ended");
            }
            print_json(&svc.get_habit(user, id)?)?;
        }
        HabitAction::Delete { id } => {
            let id = parse_habit_id(&id)?;
            svc.delete_habit(user, id)?;
            println!("habit deleted: {id}");
        }
    }
    Ok(())
}
