//! Show command implementation.

use super::Planner;
use crate::cli::ShowArgs;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the show command.
pub async fn execute_show(args: ShowArgs, planner: &Planner, formatter: &Formatter) -> Result<()> {
    let view = match args.filter() {
        Some(key) => planner.loader().load(planner.student(), Some(key)).await?,
        None => planner.view(),
    };

    println!("{}", formatter.format_view(&view)?);
    for duplicate in view.duplicates() {
        eprintln!("{}", formatter.warning(&duplicate.to_string()));
    }
    Ok(())
}
