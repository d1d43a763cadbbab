//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use trayecto_domain::{CourseState, PeriodKey};

/// Trayecto CLI - Track curriculum progress and reorganize semesters.
#[derive(Debug, Parser)]
#[command(name = "trayecto")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Student whose curriculum is edited (overrides the profile)
    #[arg(short, long, global = true)]
    pub student: Option<i64>,

    /// API bearer token (overrides the profile)
    #[arg(long, global = true, env = "TRAYECTO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log planner and HTTP activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show semesters, courses and progress
    Show(ShowArgs),

    /// Move a course to another semester or position
    Move(MoveArgs),

    /// Add a course to a semester
    Add(AddArgs),

    /// Change a course's state, grade or attempt
    Grade(GradeArgs),

    /// Make sure a semester exists for the student
    Semester(SemesterArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),

    /// Enter interactive REPL mode
    Repl,
}

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Only this year (requires --term)
    #[arg(short, long, requires = "term")]
    pub year: Option<i32>,

    /// Only this term (requires --year)
    #[arg(short, long, requires = "year")]
    pub term: Option<u8>,
}

impl ShowArgs {
    /// The semester filter, if both parts were given
    pub fn filter(&self) -> Option<PeriodKey> {
        match (self.year, self.term) {
            (Some(year), Some(term)) => Some(PeriodKey::new(year, term)),
            _ => None,
        }
    }
}

/// Arguments for the move command.
#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Course ID
    pub course: i64,

    /// Destination year
    #[arg(short, long)]
    pub year: i32,

    /// Destination term
    #[arg(short, long)]
    pub term: u8,

    /// Position within the destination semester (appended if omitted)
    #[arg(short, long)]
    pub index: Option<usize>,
}

/// Arguments for the add command.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Year of the semester
    #[arg(short, long)]
    pub year: i32,

    /// Term of the semester
    #[arg(short, long)]
    pub term: u8,

    /// Course code (e.g., MAT101)
    #[arg(long)]
    pub code: String,

    /// Course name
    #[arg(long)]
    pub name: String,

    /// Credits
    #[arg(long)]
    pub credits: u32,

    /// Initial state
    #[arg(long, value_enum, default_value = "pending")]
    pub state: StateArg,

    /// Final grade (1.0-7.0)
    #[arg(long)]
    pub grade: Option<f64>,

    /// Attempt number
    #[arg(long, default_value = "1")]
    pub attempt: u32,
}

/// Arguments for the grade command.
#[derive(Debug, Args)]
pub struct GradeArgs {
    /// Course ID
    pub course: i64,

    /// New state
    #[arg(long, value_enum)]
    pub state: Option<StateArg>,

    /// New final grade (1.0-7.0)
    #[arg(long, conflicts_with = "clear_grade")]
    pub grade: Option<f64>,

    /// Remove the final grade
    #[arg(long)]
    pub clear_grade: bool,

    /// New attempt number
    #[arg(long)]
    pub attempt: Option<u32>,
}

/// Arguments for the semester command.
#[derive(Debug, Args)]
pub struct SemesterArgs {
    /// Year
    #[arg(short, long)]
    pub year: i32,

    /// Term
    #[arg(short, long)]
    pub term: u8,
}

/// Arguments for profile management.
#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,
        /// API base URL
        #[arg(short, long)]
        url: String,
        /// Bearer token stored with the profile
        #[arg(long = "api-token")]
        api_token: Option<String>,
        /// Default student for this profile
        #[arg(long)]
        student_id: Option<i64>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Course state argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StateArg {
    /// Not started
    Pending,
    /// Being taken
    InProgress,
    /// Passed
    Approved,
    /// Not passed
    Failed,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<StateArg> for CourseState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Pending => CourseState::Pending,
            StateArg::InProgress => CourseState::InProgress,
            StateArg::Approved => CourseState::Approved,
            StateArg::Failed => CourseState::Failed,
        }
    }
}
