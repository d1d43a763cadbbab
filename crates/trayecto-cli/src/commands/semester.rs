//! Semester command implementation.

use super::Planner;
use crate::cli::SemesterArgs;
use crate::error::Result;
use crate::output::Formatter;
use trayecto_domain::PeriodKey;

/// Execute the semester command.
pub async fn execute_semester(
    args: SemesterArgs,
    planner: &Planner,
    formatter: &Formatter,
) -> Result<()> {
    let key = PeriodKey::new(args.year, args.term);
    let enrollment = planner.create_semester(key).await?;

    println!("{}", formatter.format_semester(key, enrollment)?);
    Ok(())
}
