//! Grade command implementation.

use super::Planner;
use crate::cli::GradeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use trayecto_domain::{CourseId, CoursePatch};

/// Build the patch described by the arguments.
fn patch_from_args(args: &GradeArgs) -> Result<CoursePatch> {
    let final_grade = if args.clear_grade {
        Some(None)
    } else {
        args.grade.map(Some)
    };

    let patch = CoursePatch {
        state: args.state.map(Into::into),
        final_grade,
        attempt: args.attempt,
        enrollment: None,
    };

    if patch.is_empty() {
        return Err(CliError::InvalidInput(
            "nothing to change; pass --state, --grade, --clear-grade or --attempt".to_string(),
        ));
    }
    Ok(patch)
}

/// Execute the grade command.
pub async fn execute_grade(args: GradeArgs, planner: &Planner, formatter: &Formatter) -> Result<()> {
    let patch = patch_from_args(&args)?;
    let course = planner
        .update_course(CourseId::from_value(args.course), patch)
        .await?;

    println!("{}", formatter.format_course(&course)?);
    if formatter.format() == crate::config::OutputFormat::Table {
        println!("{}", formatter.format_progress(&planner.progress())?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use trayecto_domain::CourseState;

    fn grade_args(args: &[&str]) -> GradeArgs {
        let cli = Cli::parse_from(["trayecto", "grade"].iter().chain(args));
        match cli.command {
            Some(Command::Grade(args)) => args,
            _ => panic!("Expected Grade command"),
        }
    }

    #[test]
    fn test_patch_sets_state_and_grade() {
        let patch = patch_from_args(&grade_args(&["4", "--state", "approved", "--grade", "5.5"]))
            .unwrap();
        assert_eq!(patch.state, Some(CourseState::Approved));
        assert_eq!(patch.final_grade, Some(Some(5.5)));
        assert!(patch.attempt.is_none());
    }

    #[test]
    fn test_clear_grade() {
        let patch = patch_from_args(&grade_args(&["4", "--clear-grade"])).unwrap();
        assert_eq!(patch.final_grade, Some(None));
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        let result = patch_from_args(&grade_args(&["4"]));
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
