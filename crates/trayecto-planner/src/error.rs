//! Error types for planner operations

use std::time::Duration;
use thiserror::Error;
use trayecto_domain::{CourseId, DuplicateResource, PeriodId, PeriodKey, StudentId, ViewError};

/// Errors that can occur during planner operations
///
/// Backend errors are carried as their display text so the planner error
/// stays independent of the backend type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Neither lookup nor create produced a period for the key
    #[error("Could not resolve period {key}: {reason}")]
    PeriodResolutionFailed {
        /// The (year, term) being resolved
        key: PeriodKey,
        /// Lookup and create failures
        reason: String,
    },

    /// Neither listing nor create produced an enrollment
    #[error("Could not resolve enrollment of student {student} in period {period}: {reason}")]
    EnrollmentResolutionFailed {
        /// Student being enrolled
        student: StudentId,
        /// Period being enrolled in
        period: PeriodId,
        /// List and create failures
        reason: String,
    },

    /// The store rejected or failed a course create or update
    #[error("Remote update of {} failed: {reason}", course_label(.course))]
    RemoteUpdateFailed {
        /// Course being written, if it already had an id
        course: Option<CourseId>,
        /// Backend failure
        reason: String,
    },

    /// Several backing records found for one key (non-fatal, reported)
    #[error("Duplicate resource detected: {0}")]
    DuplicateResourceDetected(DuplicateResource),

    /// A move of this course is already running
    #[error("Course {0} is already being moved")]
    MoveInFlight(CourseId),

    /// Fetching the curriculum failed
    #[error("Failed to load curriculum: {0}")]
    Load(String),

    /// A remote step missed its deadline on every attempt
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Remote step that timed out
        operation: &'static str,
        /// Deadline per attempt
        after: Duration,
    },

    /// A local view mutation was rejected
    #[error("View error: {0}")]
    View(#[from] ViewError),
}

fn course_label(course: &Option<CourseId>) -> String {
    match course {
        Some(id) => format!("course {}", id),
        None => "new course".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlannerError::MoveInFlight(CourseId::from_value(4));
        assert_eq!(err.to_string(), "Course 4 is already being moved");

        let err = PlannerError::PeriodResolutionFailed {
            key: PeriodKey::new(2025, 2),
            reason: "store offline".to_string(),
        };
        assert!(err.to_string().contains("2025-2"));

        let err = PlannerError::Timeout {
            operation: "update_course",
            after: Duration::from_secs(15),
        };
        assert_eq!(err.to_string(), "update_course timed out after 15s");
    }

    #[test]
    fn test_remote_update_messages() {
        let err = PlannerError::RemoteUpdateFailed {
            course: Some(CourseId::from_value(7)),
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Remote update of course 7 failed: HTTP 500");

        let err = PlannerError::RemoteUpdateFailed {
            course: None,
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Remote update of new course failed: HTTP 500");
    }

    #[test]
    fn test_view_error_conversion() {
        let err: PlannerError = ViewError::UnknownCourse(CourseId::from_value(9)).into();
        assert!(matches!(err, PlannerError::View(ViewError::UnknownCourse(_))));
    }
}
