//! Curriculum view - a student's courses grouped into semester buckets
//!
//! The view is a client-side cache, not the source of truth. It is rebuilt
//! from the backing store on every load and may run ahead of the store while
//! a mutation is in flight.
//!
//! Storage is arena style: course records are indexed by id and each bucket
//! holds only an ordered list of ids. Callers see the structure through
//! [`SemesterBucket`] borrows and change it only through the mutation methods,
//! which keeps two invariants:
//!
//! - every course appears in exactly one bucket
//! - buckets iterate in ascending (year, term) order
//!
//! Every successful mutation recomputes the cached [`ProgressSnapshot`].

use crate::course::{CourseId, CoursePatch, CourseRecord};
use crate::enrollment::{EnrollmentId, StudentId};
use crate::period::{PeriodId, PeriodKey};
use crate::progress::{self, BucketSummary, ProgressSnapshot};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

/// Errors raised by view mutations
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    /// No course with this id in the view
    UnknownCourse(CourseId),
    /// A course with this id is already in the view
    DuplicateCourse(CourseId),
    /// The course is not in the bucket the caller named as its origin
    NotInBucket {
        /// Course that was looked up
        course: CourseId,
        /// Bucket the caller expected
        expected: PeriodKey,
        /// Bucket the course is actually in
        actual: PeriodKey,
    },
    /// Field values the record or patch would carry are invalid
    InvalidCourse(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::UnknownCourse(id) => write!(f, "Unknown course: {}", id),
            ViewError::DuplicateCourse(id) => write!(f, "Course {} is already in the view", id),
            ViewError::NotInBucket {
                course,
                expected,
                actual,
            } => write!(
                f,
                "Course {} is in semester {}, not {}",
                course, actual, expected
            ),
            ViewError::InvalidCourse(msg) => write!(f, "Invalid course: {}", msg),
        }
    }
}

impl std::error::Error for ViewError {}

/// Result of [`CurriculumView::move_course`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Same bucket and same position; nothing changed
    NoOp,
    /// Position changed within the same bucket
    Reordered {
        /// Index before the move
        from_index: usize,
        /// Index after the move
        to_index: usize,
    },
    /// The course changed buckets
    Moved {
        /// Index in the origin bucket before the move
        from_index: usize,
        /// Index in the destination bucket after the move
        to_index: usize,
        /// Whether the destination bucket did not exist before the move
        created_bucket: bool,
    },
}

/// More than one backing record found for the same key
///
/// Produced when find-or-create races left duplicates in the store. These are
/// reported, never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateResource {
    /// Several period records share one (year, term)
    Period {
        /// The shared key
        key: PeriodKey,
        /// Every period id found for it
        ids: Vec<PeriodId>,
    },
    /// Several enrollments of the student share one (year, term)
    Enrollment {
        /// The shared key
        key: PeriodKey,
        /// Every enrollment id found for it
        ids: Vec<EnrollmentId>,
    },
}

impl fmt::Display for DuplicateResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateResource::Period { key, ids } => {
                write!(f, "{} period records for {}: {:?}", ids.len(), key, ids)
            }
            DuplicateResource::Enrollment { key, ids } => {
                write!(f, "{} enrollments for {}: {:?}", ids.len(), key, ids)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Bucket {
    enrollment: Option<EnrollmentId>,
    courses: Vec<CourseId>,
}

/// Borrowed view of one semester bucket
#[derive(Debug, Clone, Copy)]
pub struct SemesterBucket<'a> {
    key: PeriodKey,
    bucket: &'a Bucket,
    courses: &'a HashMap<CourseId, CourseRecord>,
}

impl<'a> SemesterBucket<'a> {
    /// The (year, term) of the bucket
    pub fn key(&self) -> PeriodKey {
        self.key
    }

    /// The student's enrollment backing this bucket, if resolved
    pub fn enrollment(&self) -> Option<EnrollmentId> {
        self.bucket.enrollment
    }

    /// Number of courses in the bucket
    pub fn len(&self) -> usize {
        self.bucket.courses.len()
    }

    /// Whether the bucket holds no courses
    pub fn is_empty(&self) -> bool {
        self.bucket.courses.is_empty()
    }

    /// Course ids in display order
    pub fn course_ids(&self) -> &'a [CourseId] {
        let bucket = self.bucket;
        &bucket.courses
    }

    /// Course records in display order
    pub fn courses(&self) -> impl Iterator<Item = &'a CourseRecord> + 'a {
        let (bucket, courses) = (self.bucket, self.courses);
        bucket.courses.iter().filter_map(move |id| courses.get(id))
    }

    /// Credits, approval and mean grade of this bucket
    pub fn summary(&self) -> BucketSummary {
        progress::summarize_bucket(self.key, self.courses())
    }
}

/// A student's courses grouped into ordered semester buckets
#[derive(Debug, Clone, PartialEq)]
pub struct CurriculumView {
    student: StudentId,
    courses: HashMap<CourseId, CourseRecord>,
    buckets: BTreeMap<PeriodKey, Bucket>,
    duplicates: Vec<DuplicateResource>,
    progress: ProgressSnapshot,
}

impl CurriculumView {
    /// Create an empty view for a student
    pub fn new(student: StudentId) -> Self {
        Self {
            student,
            courses: HashMap::new(),
            buckets: BTreeMap::new(),
            duplicates: Vec::new(),
            progress: ProgressSnapshot::default(),
        }
    }

    /// The student this view belongs to
    pub fn student(&self) -> StudentId {
        self.student
    }

    /// Buckets in ascending (year, term) order
    pub fn buckets(&self) -> impl Iterator<Item = SemesterBucket<'_>> + '_ {
        self.buckets.iter().map(move |(key, bucket)| SemesterBucket {
            key: *key,
            bucket,
            courses: &self.courses,
        })
    }

    /// Look up one bucket
    pub fn bucket(&self, key: PeriodKey) -> Option<SemesterBucket<'_>> {
        self.buckets.get(&key).map(|bucket| SemesterBucket {
            key,
            bucket,
            courses: &self.courses,
        })
    }

    /// Number of buckets
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of courses
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the view has no buckets at all
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Look up a course record
    pub fn course(&self, id: CourseId) -> Option<&CourseRecord> {
        self.courses.get(&id)
    }

    /// Find the bucket and position of a course
    pub fn locate(&self, id: CourseId) -> Option<(PeriodKey, usize)> {
        self.buckets.iter().find_map(|(key, bucket)| {
            bucket
                .courses
                .iter()
                .position(|c| *c == id)
                .map(|index| (*key, index))
        })
    }

    /// The cached progress snapshot
    pub fn progress(&self) -> &ProgressSnapshot {
        &self.progress
    }

    /// Per-bucket statistics in bucket order
    pub fn bucket_summaries(&self) -> Vec<BucketSummary> {
        self.buckets().map(|b| b.summary()).collect()
    }

    /// Duplicate backing records found by the load that built this view
    pub fn duplicates(&self) -> &[DuplicateResource] {
        &self.duplicates
    }

    /// Record duplicate findings from a load
    pub fn record_duplicates(&mut self, duplicates: Vec<DuplicateResource>) {
        self.duplicates = duplicates;
    }

    /// Check the partition invariant: each course id in exactly one bucket,
    /// and every bucketed id backed by a record
    pub fn is_partitioned(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.courses.len());
        for bucket in self.buckets.values() {
            for id in &bucket.courses {
                if !seen.insert(*id) || !self.courses.contains_key(id) {
                    return false;
                }
            }
        }
        seen.len() == self.courses.len()
    }

    /// Create a semester bucket, or attach an enrollment to an existing one
    ///
    /// Returns `true` if the bucket was created.
    pub fn add_bucket(&mut self, key: PeriodKey, enrollment: Option<EnrollmentId>) -> bool {
        match self.buckets.get_mut(&key) {
            Some(bucket) => {
                if enrollment.is_some() {
                    bucket.enrollment = enrollment;
                }
                false
            }
            None => {
                self.buckets.insert(
                    key,
                    Bucket {
                        enrollment,
                        courses: Vec::new(),
                    },
                );
                true
            }
        }
    }

    /// Remove a bucket if it holds no courses
    ///
    /// Returns `true` if a bucket was removed.
    pub fn remove_empty_bucket(&mut self, key: PeriodKey) -> bool {
        if self.buckets.get(&key).is_some_and(|b| b.courses.is_empty()) {
            self.buckets.remove(&key);
            true
        } else {
            false
        }
    }

    /// Append a course to a bucket, creating the bucket if needed
    ///
    /// Records are taken as the store delivered them. Grades off the scale
    /// are kept but left out of the mean grade.
    pub fn add_course(&mut self, key: PeriodKey, course: CourseRecord) -> Result<(), ViewError> {
        if self.courses.contains_key(&course.id) {
            return Err(ViewError::DuplicateCourse(course.id));
        }

        let bucket = self.buckets.entry(key).or_default();
        if bucket.enrollment.is_none() {
            bucket.enrollment = Some(course.enrollment);
        }
        bucket.courses.push(course.id);
        self.courses.insert(course.id, course);

        self.refresh_progress();
        Ok(())
    }

    /// Apply a partial update to a course
    pub fn update_course(&mut self, id: CourseId, patch: &CoursePatch) -> Result<(), ViewError> {
        patch.validate().map_err(ViewError::InvalidCourse)?;
        let course = self
            .courses
            .get_mut(&id)
            .ok_or(ViewError::UnknownCourse(id))?;
        patch.apply(course);

        self.refresh_progress();
        Ok(())
    }

    /// Replace a course record wholesale, keeping its position
    pub fn replace_course(&mut self, course: CourseRecord) -> Result<(), ViewError> {
        let slot = self
            .courses
            .get_mut(&course.id)
            .ok_or(ViewError::UnknownCourse(course.id))?;
        *slot = course;

        self.refresh_progress();
        Ok(())
    }

    /// Remove a course from the view
    ///
    /// Its bucket is kept even if it becomes empty.
    pub fn remove_course(&mut self, id: CourseId) -> Result<CourseRecord, ViewError> {
        let (key, index) = self.locate(id).ok_or(ViewError::UnknownCourse(id))?;
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.courses.remove(index);
        }
        let course = self
            .courses
            .remove(&id)
            .ok_or(ViewError::UnknownCourse(id))?;

        self.refresh_progress();
        Ok(course)
    }

    /// Move a course from one bucket to a position in another
    ///
    /// `target_index` is clamped to the destination's length. A missing
    /// destination bucket is created without an enrollment. Moving a course to
    /// its current bucket and position changes nothing.
    pub fn move_course(
        &mut self,
        id: CourseId,
        from: PeriodKey,
        to: PeriodKey,
        target_index: usize,
    ) -> Result<MoveOutcome, ViewError> {
        let (actual, from_index) = self.locate(id).ok_or(ViewError::UnknownCourse(id))?;
        if actual != from {
            return Err(ViewError::NotInBucket {
                course: id,
                expected: from,
                actual,
            });
        }

        let outcome = if from == to {
            let Some(bucket) = self.buckets.get_mut(&from) else {
                return Err(ViewError::UnknownCourse(id));
            };
            let to_index = target_index.min(bucket.courses.len() - 1);
            if to_index == from_index {
                return Ok(MoveOutcome::NoOp);
            }
            let moved = bucket.courses.remove(from_index);
            bucket.courses.insert(to_index, moved);
            MoveOutcome::Reordered {
                from_index,
                to_index,
            }
        } else {
            if let Some(origin) = self.buckets.get_mut(&from) {
                origin.courses.remove(from_index);
            }
            let created_bucket = !self.buckets.contains_key(&to);
            let destination = self.buckets.entry(to).or_default();
            let to_index = target_index.min(destination.courses.len());
            destination.courses.insert(to_index, id);
            MoveOutcome::Moved {
                from_index,
                to_index,
                created_bucket,
            }
        };

        self.refresh_progress();
        Ok(outcome)
    }

    fn refresh_progress(&mut self) {
        self.progress = progress::recompute(self.courses.values());
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add { bucket: u8 },
        Move { pick: usize, bucket: u8, index: usize },
        Remove { pick: usize },
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..6).prop_map(|bucket| Op::Add { bucket }),
            (any::<usize>(), 0u8..6, 0usize..8)
                .prop_map(|(pick, bucket, index)| Op::Move { pick, bucket, index }),
            any::<usize>().prop_map(|pick| Op::Remove { pick }),
        ]
    }

    fn bucket_key(bucket: u8) -> PeriodKey {
        PeriodKey::new(2023 + i32::from(bucket / 2), bucket % 2 + 1)
    }

    proptest! {
        /// Property: any sequence of mutations keeps every course in exactly one bucket
        #[test]
        fn test_partition_invariant(ops in proptest::collection::vec(arb_op(), 0..40)) {
            let mut view = CurriculumView::new(StudentId::from_value(1));
            let mut live: Vec<CourseId> = Vec::new();
            let mut next_id = 0i64;

            for op in ops {
                match op {
                    Op::Add { bucket } => {
                        next_id += 1;
                        let id = CourseId::from_value(next_id);
                        let course = CourseRecord::new(id, "X", "X", EnrollmentId::from_value(1), 3);
                        view.add_course(bucket_key(bucket), course).unwrap();
                        live.push(id);
                    }
                    Op::Move { pick, bucket, index } if !live.is_empty() => {
                        let id = live[pick % live.len()];
                        let (from, _) = view.locate(id).unwrap();
                        view.move_course(id, from, bucket_key(bucket), index).unwrap();
                    }
                    Op::Remove { pick } if !live.is_empty() => {
                        let id = live.remove(pick % live.len());
                        view.remove_course(id).unwrap();
                    }
                    _ => {}
                }

                prop_assert!(view.is_partitioned());
                prop_assert_eq!(view.len(), live.len());
                let keys: Vec<_> = view.buckets().map(|b| b.key()).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
                prop_assert_eq!(view.progress().total_credits as usize, live.len() * 3);
            }
        }
    }
}
