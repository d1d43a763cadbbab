//! Trait definitions for external interactions
//!
//! These traits define the boundary between the curriculum core and the
//! remote services that own periods, enrollments and course records.
//! Implementations live in other crates.

use crate::{
    AcademicPeriod, CourseId, CoursePatch, CourseRecord, NewCourse, PeriodId, PeriodKey,
    StudentId, StudentPeriodEnrollment,
};
use std::future::Future;

/// Remote store of periods, enrollments and course records
///
/// Implemented by the infrastructure layer (trayecto-sdk). The store offers no
/// compare-and-swap, so find-then-create sequences built on it are not atomic.
pub trait CurriculumBackend: Send + Sync {
    /// Error type for backend operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up the period for a (year, term); `None` when it does not exist
    fn find_period(
        &self,
        key: PeriodKey,
    ) -> impl Future<Output = Result<Option<AcademicPeriod>, Self::Error>> + Send;

    /// Create the period for a (year, term)
    fn create_period(
        &self,
        key: PeriodKey,
    ) -> impl Future<Output = Result<AcademicPeriod, Self::Error>> + Send;

    /// List every enrollment of a student
    fn list_enrollments(
        &self,
        student: StudentId,
    ) -> impl Future<Output = Result<Vec<StudentPeriodEnrollment>, Self::Error>> + Send;

    /// Enroll a student in a period
    fn create_enrollment(
        &self,
        student: StudentId,
        period: PeriodId,
    ) -> impl Future<Output = Result<StudentPeriodEnrollment, Self::Error>> + Send;

    /// List a student's course records, optionally filtered server-side by period
    fn list_courses(
        &self,
        student: StudentId,
        filter: Option<PeriodKey>,
    ) -> impl Future<Output = Result<Vec<CourseRecord>, Self::Error>> + Send;

    /// Create a course record
    fn create_course(
        &self,
        course: NewCourse,
    ) -> impl Future<Output = Result<CourseRecord, Self::Error>> + Send;

    /// Apply a partial update to a course record
    fn update_course(
        &self,
        id: CourseId,
        patch: CoursePatch,
    ) -> impl Future<Output = Result<CourseRecord, Self::Error>> + Send;
}
