//! Move command implementation.

use super::Planner;
use crate::cli::MoveArgs;
use crate::error::Result;
use crate::output::Formatter;
use trayecto_domain::{CourseId, PeriodKey};

/// Execute the move command.
pub async fn execute_move(args: MoveArgs, planner: &Planner, formatter: &Formatter) -> Result<()> {
    let course = CourseId::from_value(args.course);
    let to = PeriodKey::new(args.year, args.term);

    let report = planner.move_course(course, to, args.index).await?;
    println!("{}", formatter.format_move(&report)?);
    Ok(())
}
