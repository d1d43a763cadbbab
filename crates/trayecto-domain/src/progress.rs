//! Progress statistics derived from a curriculum view
//!
//! All functions here are pure. A [`CurriculumView`](crate::CurriculumView)
//! calls [`recompute`] after every mutation and caches the result.

use crate::course::{validate_grade, CourseRecord, CourseState};
use crate::period::PeriodKey;

/// Aggregate statistics over every course in a view
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressSnapshot {
    /// Sum of credit weight over all courses
    pub total_credits: u32,
    /// Credit weight of approved courses
    pub approved_credits: u32,
    /// Credit weight not yet approved (`total - approved`)
    pub pending_credits: u32,
    /// `approved / total * 100`, or 0 when there are no credits
    pub percent_advanced: f64,
    /// Mean final grade over approved courses that have a grade, or 0
    pub mean_grade: f64,
    /// Number of courses per state
    pub counts: StateCounts,
}

/// Course counts per state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateCounts {
    /// Pending courses
    pub pending: usize,
    /// In-progress courses
    pub in_progress: usize,
    /// Approved courses
    pub approved: usize,
    /// Failed courses
    pub failed: usize,
}

impl StateCounts {
    /// Total number of courses counted
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.approved + self.failed
    }
}

/// Per-semester statistics ("semester performance")
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSummary {
    /// The semester
    pub key: PeriodKey,
    /// Number of courses in the bucket
    pub courses: usize,
    /// Sum of credit weight in the bucket
    pub credits: u32,
    /// Credit weight of approved courses in the bucket
    pub approved_credits: u32,
    /// Mean grade over approved graded courses in the bucket, or 0
    pub mean_grade: f64,
}

/// Compute a snapshot over a set of courses
///
/// Ungraded approved courses, and approved courses whose stored grade is off
/// the scale, are left out of both the numerator and the denominator of the
/// mean grade. Credit sums saturate.
pub fn recompute<'a, I>(courses: I) -> ProgressSnapshot
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let mut snapshot = ProgressSnapshot::default();
    let mut grade_sum = 0.0;
    let mut graded = 0usize;

    for course in courses {
        snapshot.total_credits = snapshot.total_credits.saturating_add(course.credits);
        match course.state {
            CourseState::Pending => snapshot.counts.pending += 1,
            CourseState::InProgress => snapshot.counts.in_progress += 1,
            CourseState::Failed => snapshot.counts.failed += 1,
            CourseState::Approved => {
                snapshot.counts.approved += 1;
                snapshot.approved_credits = snapshot.approved_credits.saturating_add(course.credits);
                if let Some(grade) = course.final_grade.filter(|g| validate_grade(*g).is_ok()) {
                    grade_sum += grade;
                    graded += 1;
                }
            }
        }
    }

    snapshot.pending_credits = snapshot.total_credits - snapshot.approved_credits;
    snapshot.percent_advanced = percent(snapshot.approved_credits, snapshot.total_credits);
    snapshot.mean_grade = mean(grade_sum, graded);
    snapshot
}

/// Summarize a single bucket
pub fn summarize_bucket<'a, I>(key: PeriodKey, courses: I) -> BucketSummary
where
    I: IntoIterator<Item = &'a CourseRecord>,
{
    let mut count = 0;
    let snapshot = recompute(courses.into_iter().inspect(|_| count += 1));
    BucketSummary {
        key,
        courses: count,
        credits: snapshot.total_credits,
        approved_credits: snapshot.approved_credits,
        mean_grade: snapshot.mean_grade,
    }
}

fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        0.0
    } else {
        f64::from(part) / f64::from(whole) * 100.0
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::CourseId;
    use crate::enrollment::EnrollmentId;

    fn course(id: i64, credits: u32, state: CourseState, grade: Option<f64>) -> CourseRecord {
        let mut c = CourseRecord::new(
            CourseId::from_value(id),
            format!("C{}", id),
            format!("Course {}", id),
            EnrollmentId::from_value(1),
            credits,
        )
        .with_state(state);
        c.final_grade = grade;
        c
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = recompute(std::iter::empty());
        assert_eq!(snapshot, ProgressSnapshot::default());
        assert_eq!(snapshot.percent_advanced, 0.0);
        assert_eq!(snapshot.mean_grade, 0.0);
    }

    #[test]
    fn test_ungraded_approved_excluded_from_mean() {
        let courses = vec![
            course(1, 4, CourseState::Approved, Some(6.0)),
            course(2, 4, CourseState::Approved, None),
        ];
        let snapshot = recompute(&courses);
        assert_eq!(snapshot.mean_grade, 6.0);
        assert_eq!(snapshot.approved_credits, 8);
        assert_eq!(snapshot.percent_advanced, 100.0);
    }

    #[test]
    fn test_failed_grades_do_not_count() {
        let courses = vec![
            course(1, 6, CourseState::Approved, Some(5.0)),
            course(2, 6, CourseState::Failed, Some(2.0)),
            course(3, 4, CourseState::InProgress, None),
            course(4, 4, CourseState::Pending, None),
        ];
        let snapshot = recompute(&courses);
        assert_eq!(snapshot.total_credits, 20);
        assert_eq!(snapshot.approved_credits, 6);
        assert_eq!(snapshot.pending_credits, 14);
        assert_eq!(snapshot.percent_advanced, 30.0);
        assert_eq!(snapshot.mean_grade, 5.0);
        assert_eq!(snapshot.counts.total(), 4);
        assert_eq!(snapshot.counts.failed, 1);
    }

    #[test]
    fn test_off_scale_grades_excluded_from_mean() {
        let courses = vec![
            course(1, 6, CourseState::Approved, Some(5.5)),
            course(2, 4, CourseState::Approved, Some(0.0)),
        ];
        let snapshot = recompute(&courses);
        assert_eq!(snapshot.mean_grade, 5.5);
        assert_eq!(snapshot.approved_credits, 10);
    }

    #[test]
    fn test_credit_sums_saturate() {
        let courses = vec![
            course(1, u32::MAX, CourseState::Approved, None),
            course(2, 10, CourseState::Approved, None),
            course(3, 5, CourseState::Pending, None),
        ];
        let snapshot = recompute(&courses);
        assert_eq!(snapshot.total_credits, u32::MAX);
        assert_eq!(snapshot.approved_credits, u32::MAX);
        assert_eq!(snapshot.pending_credits, 0);
    }

    #[test]
    fn test_zero_credit_courses_never_divide_by_zero() {
        let courses = vec![course(1, 0, CourseState::Approved, Some(7.0))];
        let snapshot = recompute(&courses);
        assert_eq!(snapshot.percent_advanced, 0.0);
        assert_eq!(snapshot.mean_grade, 7.0);
    }

    #[test]
    fn test_bucket_summary() {
        let courses = vec![
            course(1, 5, CourseState::Approved, Some(4.0)),
            course(2, 5, CourseState::Approved, Some(6.0)),
            course(3, 2, CourseState::Pending, None),
        ];
        let summary = summarize_bucket(PeriodKey::new(2025, 1), &courses);
        assert_eq!(summary.courses, 3);
        assert_eq!(summary.credits, 12);
        assert_eq!(summary.approved_credits, 10);
        assert_eq!(summary.mean_grade, 5.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::course::CourseId;
    use crate::enrollment::EnrollmentId;
    use proptest::prelude::*;

    fn arb_course() -> impl Strategy<Value = (u32, u8, Option<f64>)> {
        (0u32..12, 0u8..4, proptest::option::of(1.0f64..=7.0))
    }

    fn build(specs: &[(u32, u8, Option<f64>)]) -> Vec<CourseRecord> {
        specs
            .iter()
            .enumerate()
            .map(|(i, (credits, state, grade))| {
                let state = match state {
                    0 => CourseState::Pending,
                    1 => CourseState::InProgress,
                    2 => CourseState::Approved,
                    _ => CourseState::Failed,
                };
                let mut c = CourseRecord::new(
                    CourseId::from_value(i as i64),
                    "X",
                    "X",
                    EnrollmentId::from_value(1),
                    *credits,
                )
                .with_state(state);
                c.final_grade = *grade;
                c
            })
            .collect()
    }

    proptest! {
        /// Property: approving a pending course never lowers percent advanced
        #[test]
        fn test_approval_is_monotone(specs in proptest::collection::vec(arb_course(), 1..20), pick: usize) {
            let mut courses = build(&specs);
            let index = pick % courses.len();
            courses[index].state = CourseState::Pending;
            let before = recompute(&courses).percent_advanced;

            courses[index].state = CourseState::Approved;
            let after = recompute(&courses).percent_advanced;

            prop_assert!(after >= before, "{} < {}", after, before);
        }

        /// Property: credits split exactly into approved and pending
        #[test]
        fn test_credit_split(specs in proptest::collection::vec(arb_course(), 0..20)) {
            let snapshot = recompute(&build(&specs));
            prop_assert_eq!(snapshot.approved_credits + snapshot.pending_credits, snapshot.total_credits);
            prop_assert!(snapshot.percent_advanced >= 0.0 && snapshot.percent_advanced <= 100.0);
            prop_assert!(snapshot.mean_grade == 0.0 || (1.0..=7.0).contains(&snapshot.mean_grade));
        }
    }
}
