//! Trayecto Domain Layer
//!
//! Core model for curriculum progress tracking: academic periods, student
//! enrollments, course records, the client-side curriculum view and the
//! progress statistics derived from it.
//!
//! ## Key Concepts
//!
//! - **Academic period**: a (year, term) slot in the institution's calendar
//! - **Enrollment**: the association of one student to one academic period
//! - **Course record**: one course attempt, owned by exactly one enrollment
//! - **Curriculum view**: courses grouped into semester buckets, sorted by (year, term)
//! - **Progress snapshot**: credits, percent advanced and mean grade over a view
//!
//! ## Architecture
//!
//! This crate has no external dependencies. Remote collaborators are reached
//! through the [`traits::CurriculumBackend`] trait, implemented in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod course;
pub mod enrollment;
mod id;
pub mod period;
pub mod progress;
pub mod traits;
pub mod view;

// Re-exports for convenience
pub use classifier::{FallbackClassifier, KeywordClassifier, KeywordRule};
pub use course::{CourseId, CoursePatch, CourseRecord, CourseState, NewCourse};
pub use enrollment::{EnrollmentId, StudentId, StudentPeriodEnrollment};
pub use period::{AcademicPeriod, PeriodId, PeriodKey};
pub use progress::{BucketSummary, ProgressSnapshot};
pub use traits::CurriculumBackend;
pub use view::{CurriculumView, DuplicateResource, MoveOutcome, SemesterBucket, ViewError};
