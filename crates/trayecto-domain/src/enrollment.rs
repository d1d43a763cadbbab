//! Student enrollments in academic periods

use crate::id::opaque_id;
use crate::period::{PeriodId, PeriodKey};

opaque_id!(
    /// Identifier of a student
    StudentId
);

opaque_id!(
    /// Identifier of a [`StudentPeriodEnrollment`]
    EnrollmentId
);

/// The record stating that a student is active in a period
///
/// At most one enrollment exists per (student, period) pair. Courses can only
/// be filed into a period once this record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentPeriodEnrollment {
    /// Store-assigned identifier
    pub id: EnrollmentId,
    /// Enrolled student
    pub student: StudentId,
    /// Period the student is enrolled in
    pub period: PeriodId,
    /// (year, term) of the period, when the store embeds it
    pub period_key: Option<PeriodKey>,
    /// Start date (ISO-8601), if recorded
    pub start_date: Option<String>,
    /// End date (ISO-8601), if recorded
    pub end_date: Option<String>,
    /// Whether the student is currently enrolled
    pub currently_enrolled: bool,
    /// Free-text notes
    pub notes: Option<String>,
}

impl StudentPeriodEnrollment {
    /// Create an enrollment record with no dates or notes
    pub fn new(id: EnrollmentId, student: StudentId, period: PeriodId) -> Self {
        Self {
            id,
            student,
            period,
            period_key: None,
            start_date: None,
            end_date: None,
            currently_enrolled: false,
            notes: None,
        }
    }

    /// Attach the (year, term) of the enrollment's period
    pub fn with_period_key(mut self, key: PeriodKey) -> Self {
        self.period_key = Some(key);
        self
    }
}
