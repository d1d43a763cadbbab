//! Add command implementation.

use super::Planner;
use crate::cli::AddArgs;
use crate::error::Result;
use crate::output::Formatter;
use trayecto_domain::PeriodKey;
use trayecto_planner::CourseDraft;

/// Build the course draft described by the arguments.
fn draft_from_args(args: &AddArgs) -> CourseDraft {
    let mut draft = CourseDraft::new(args.code.clone(), args.name.clone(), args.credits);
    draft.state = args.state.into();
    draft.final_grade = args.grade;
    draft.attempt = args.attempt;
    draft
}

/// Execute the add command.
pub async fn execute_add(args: AddArgs, planner: &Planner, formatter: &Formatter) -> Result<()> {
    let key = PeriodKey::new(args.year, args.term);
    let course = planner.add_course(key, draft_from_args(&args)).await?;

    println!("{}", formatter.format_course(&course)?);
    Ok(())
}
