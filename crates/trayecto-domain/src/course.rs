//! Course records - one course attempt owned by one enrollment

use crate::enrollment::{EnrollmentId, StudentId};
use crate::id::opaque_id;
use crate::period::PeriodKey;

opaque_id!(
    /// Identifier of a [`CourseRecord`]
    CourseId
);

/// Lowest grade on the institution's scale
pub const MIN_GRADE: f64 = 1.0;

/// Highest grade on the institution's scale
pub const MAX_GRADE: f64 = 7.0;

/// Check that a grade lies on the 1.0 - 7.0 scale
pub fn validate_grade(grade: f64) -> Result<f64, String> {
    if grade.is_finite() && (MIN_GRADE..=MAX_GRADE).contains(&grade) {
        Ok(grade)
    } else {
        Err(format!(
            "Grade {} outside the {:.1}-{:.1} scale",
            grade, MIN_GRADE, MAX_GRADE
        ))
    }
}

/// Lifecycle state of a course attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseState {
    /// Not started yet
    Pending,
    /// Currently being taken
    InProgress,
    /// Passed; counts toward progress
    Approved,
    /// Not passed
    Failed,
}

impl CourseState {
    /// Get the state name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseState::Pending => "pending",
            CourseState::InProgress => "in-progress",
            CourseState::Approved => "approved",
            CourseState::Failed => "failed",
        }
    }

    /// Parse a state from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(CourseState::Pending),
            "in-progress" | "in_progress" | "inprogress" => Some(CourseState::InProgress),
            "approved" => Some(CourseState::Approved),
            "failed" => Some(CourseState::Failed),
            _ => None,
        }
    }
}

impl std::str::FromStr for CourseState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid course state: {}", s))
    }
}

/// One course a student is taking or has taken
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    /// Store-assigned identifier
    pub id: CourseId,
    /// Course code, e.g. `MAT101`
    pub code: String,
    /// Display name
    pub name: String,
    /// Enrollment this course belongs to
    pub enrollment: EnrollmentId,
    /// (year, term) from the enrollment/period chain, when the store embeds it
    pub period: Option<PeriodKey>,
    /// Current state
    pub state: CourseState,
    /// Final grade, if recorded
    pub final_grade: Option<f64>,
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Credit weight
    pub credits: u32,
}

impl CourseRecord {
    /// Create a pending, ungraded first attempt
    pub fn new(
        id: CourseId,
        code: impl Into<String>,
        name: impl Into<String>,
        enrollment: EnrollmentId,
        credits: u32,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            enrollment,
            period: None,
            state: CourseState::Pending,
            final_grade: None,
            attempt: 1,
            credits,
        }
    }

    /// Set the course state
    pub fn with_state(mut self, state: CourseState) -> Self {
        self.state = state;
        self
    }

    /// Set the final grade
    pub fn with_grade(mut self, grade: f64) -> Self {
        self.final_grade = Some(grade);
        self
    }

    /// Set the (year, term) from the period chain
    pub fn with_period(mut self, key: PeriodKey) -> Self {
        self.period = Some(key);
        self
    }

    /// Validate grade scale and attempt number
    pub fn validate(&self) -> Result<(), String> {
        if let Some(grade) = self.final_grade {
            validate_grade(grade)?;
        }
        if self.attempt == 0 {
            return Err(format!("Course {} has attempt number 0", self.id));
        }
        Ok(())
    }
}

/// Partial update of a course record
///
/// `None` leaves a field untouched. `final_grade: Some(None)` clears the grade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    /// New state
    pub state: Option<CourseState>,
    /// New grade, or `Some(None)` to clear it
    pub final_grade: Option<Option<f64>>,
    /// New attempt number
    pub attempt: Option<u32>,
    /// New owning enrollment (a semester reassignment)
    pub enrollment: Option<EnrollmentId>,
}

impl CoursePatch {
    /// A patch that only re-points the course to another enrollment
    pub fn reassign(enrollment: EnrollmentId) -> Self {
        Self {
            enrollment: Some(enrollment),
            ..Default::default()
        }
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.final_grade.is_none()
            && self.attempt.is_none()
            && self.enrollment.is_none()
    }

    /// Validate the fields the patch would write
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Some(grade)) = self.final_grade {
            validate_grade(grade)?;
        }
        if self.attempt == Some(0) {
            return Err("Attempt number must be at least 1".to_string());
        }
        Ok(())
    }

    /// Apply the patch to a record
    pub fn apply(&self, course: &mut CourseRecord) {
        if let Some(state) = self.state {
            course.state = state;
        }
        if let Some(grade) = self.final_grade {
            course.final_grade = grade;
        }
        if let Some(attempt) = self.attempt {
            course.attempt = attempt;
        }
        if let Some(enrollment) = self.enrollment {
            course.enrollment = enrollment;
        }
    }
}

/// Payload for creating a course record
#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    /// Owning student
    pub student: StudentId,
    /// Enrollment to file the course under
    pub enrollment: EnrollmentId,
    /// Course code
    pub code: String,
    /// Display name
    pub name: String,
    /// Initial state
    pub state: CourseState,
    /// Final grade, if already known
    pub final_grade: Option<f64>,
    /// Attempt number
    pub attempt: u32,
    /// Credit weight
    pub credits: u32,
}
