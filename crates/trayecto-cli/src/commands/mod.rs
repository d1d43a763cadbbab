//! Command implementations.

pub mod add;
pub mod grade;
pub mod move_cmd;
pub mod profile;
pub mod semester;
pub mod session;
pub mod show;

pub use self::add::execute_add;
pub use self::grade::execute_grade;
pub use self::move_cmd::execute_move;
pub use self::profile::execute_profile;
pub use self::semester::execute_semester;
pub use self::session::{open_planner, Planner, SessionOptions};
pub use self::show::execute_show;

use crate::cli::Command;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Run a command that works on the student's curriculum.
pub async fn execute_planner_command(
    command: Command,
    planner: &Planner,
    formatter: &Formatter,
) -> Result<()> {
    match command {
        Command::Show(args) => execute_show(args, planner, formatter).await,
        Command::Move(args) => execute_move(args, planner, formatter).await,
        Command::Add(args) => execute_add(args, planner, formatter).await,
        Command::Grade(args) => execute_grade(args, planner, formatter).await,
        Command::Semester(args) => execute_semester(args, planner, formatter).await,
        Command::Profile(_) | Command::Repl => Err(CliError::InvalidInput(
            "command does not operate on a curriculum".to_string(),
        )),
    }
}
