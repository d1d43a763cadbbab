//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use trayecto_domain::{
    CourseRecord, CourseState, CurriculumView, EnrollmentId, MoveOutcome, PeriodKey,
    ProgressSnapshot, SemesterBucket,
};
use trayecto_planner::MoveReport;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether output is colorized.
    pub fn color_enabled(&self) -> bool {
        self.color_enabled
    }

    /// Format a whole curriculum view: semesters, courses and progress.
    pub fn format_view(&self, view: &CurriculumView) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&view_json(view))?),
            OutputFormat::Table => Ok(self.format_view_table(view)),
            OutputFormat::Quiet => Ok(view
                .buckets()
                .flat_map(|b| b.course_ids().iter().map(|id| id.to_string()).collect::<Vec<_>>())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_view_table(&self, view: &CurriculumView) -> String {
        if view.bucket_count() == 0 {
            return self.colorize("No semesters found.", "yellow");
        }

        let mut sections = Vec::new();
        for bucket in view.buckets() {
            let summary = bucket.summary();
            let heading = format!(
                "Semester {} ({} courses, {} credits)",
                bucket.key(),
                summary.courses,
                summary.credits
            );
            sections.push(self.colorize(&heading, "cyan"));

            if bucket.is_empty() {
                sections.push("  (no courses)".to_string());
            } else {
                sections.push(self.courses_table(bucket.courses()));
            }
        }
        sections.push(self.progress_table(view.progress()));
        sections.join("\n")
    }

    fn courses_table<'a>(&self, courses: impl Iterator<Item = &'a CourseRecord>) -> String {
        let mut builder = Builder::default();
        builder.push_record(["ID", "Code", "Name", "Credits", "State", "Grade", "Attempt"]);

        for course in courses {
            builder.push_record([
                course.id.to_string(),
                course.code.clone(),
                course.name.clone(),
                course.credits.to_string(),
                self.state_label(course.state),
                format_grade(course.final_grade),
                course.attempt.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn progress_table(&self, progress: &ProgressSnapshot) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Total", "Approved", "Pending", "Advanced", "Mean grade"]);
        builder.push_record([
            progress.total_credits.to_string(),
            progress.approved_credits.to_string(),
            progress.pending_credits.to_string(),
            format!("{:.1}%", progress.percent_advanced),
            format!("{:.2}", progress.mean_grade),
        ]);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format progress figures on their own.
    pub fn format_progress(&self, progress: &ProgressSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&progress_json(progress))?),
            OutputFormat::Table => Ok(self.progress_table(progress)),
            OutputFormat::Quiet => Ok(format!("{:.1}", progress.percent_advanced)),
        }
    }

    /// Format a single course.
    pub fn format_course(&self, course: &CourseRecord) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&course_json(course))?),
            OutputFormat::Table => Ok(self.courses_table(std::iter::once(course))),
            OutputFormat::Quiet => Ok(course.id.to_string()),
        }
    }

    /// Format the result of a move.
    pub fn format_move(&self, report: &MoveReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "op_id": report.op_id.to_string(),
                "course": report.course.value(),
                "from": period_json(report.from),
                "to": period_json(report.to),
                "outcome": outcome_name(&report.outcome),
                "state": report.state.as_str(),
                "enrollment": report.enrollment.map(|e| e.value()),
            }))?),
            OutputFormat::Table => Ok(self.success(&describe_move(report))),
            OutputFormat::Quiet => Ok(report.course.to_string()),
        }
    }

    /// Format a resolved semester.
    pub fn format_semester(&self, key: PeriodKey, enrollment: EnrollmentId) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "period": period_json(key),
                "enrollment": enrollment.value(),
            }))?),
            OutputFormat::Table => Ok(self.success(&format!(
                "Semester {} ready (enrollment {})",
                key, enrollment
            ))),
            OutputFormat::Quiet => Ok(enrollment.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn state_label(&self, state: CourseState) -> String {
        let color = match state {
            CourseState::Approved => "green",
            CourseState::Failed => "red",
            CourseState::InProgress => "blue",
            CourseState::Pending => "",
        };
        self.colorize(state.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn format_grade(grade: Option<f64>) -> String {
    grade.map(|g| format!("{:.1}", g)).unwrap_or_else(|| "-".to_string())
}

fn describe_move(report: &MoveReport) -> String {
    match report.outcome {
        MoveOutcome::NoOp => format!("Course {} already in place", report.course),
        MoveOutcome::Reordered { from_index, to_index } => format!(
            "Course {} reordered in {} ({} -> {})",
            report.course, report.to, from_index, to_index
        ),
        MoveOutcome::Moved { created_bucket, .. } => {
            let mut msg = format!(
                "Course {} moved from {} to {}",
                report.course, report.from, report.to
            );
            if created_bucket {
                msg.push_str(" (new semester)");
            }
            msg
        }
    }
}

fn outcome_name(outcome: &MoveOutcome) -> &'static str {
    match outcome {
        MoveOutcome::NoOp => "noop",
        MoveOutcome::Reordered { .. } => "reordered",
        MoveOutcome::Moved { .. } => "moved",
    }
}

fn period_json(key: PeriodKey) -> Value {
    json!({ "year": key.year, "term": key.term })
}

fn course_json(course: &CourseRecord) -> Value {
    json!({
        "id": course.id.value(),
        "code": course.code,
        "name": course.name,
        "enrollment": course.enrollment.value(),
        "period": course.period.map(period_json),
        "state": course.state.as_str(),
        "final_grade": course.final_grade,
        "attempt": course.attempt,
        "credits": course.credits,
    })
}

fn progress_json(progress: &ProgressSnapshot) -> Value {
    json!({
        "total_credits": progress.total_credits,
        "approved_credits": progress.approved_credits,
        "pending_credits": progress.pending_credits,
        "percent_advanced": progress.percent_advanced,
        "mean_grade": progress.mean_grade,
        "counts": {
            "pending": progress.counts.pending,
            "in_progress": progress.counts.in_progress,
            "approved": progress.counts.approved,
            "failed": progress.counts.failed,
        },
    })
}

fn bucket_json(bucket: &SemesterBucket<'_>) -> Value {
    let summary = bucket.summary();
    json!({
        "period": period_json(bucket.key()),
        "enrollment": bucket.enrollment().map(|e| e.value()),
        "credits": summary.credits,
        "approved_credits": summary.approved_credits,
        "mean_grade": summary.mean_grade,
        "courses": bucket.courses().map(course_json).collect::<Vec<_>>(),
    })
}

fn view_json(view: &CurriculumView) -> Value {
    json!({
        "student": view.student().value(),
        "semesters": view.buckets().map(|b| bucket_json(&b)).collect::<Vec<_>>(),
        "progress": progress_json(view.progress()),
        "duplicates": view
            .duplicates()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>(),
    })
}
