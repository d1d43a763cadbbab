//! Building curriculum views from the in-memory store

mod common;

use common::{MockBackend, Op};
use std::sync::Arc;
use trayecto_domain::{
    CourseState, DuplicateResource, EnrollmentId, KeywordClassifier, PeriodKey, StudentId,
};
use trayecto_planner::{CurriculumLoader, PlannerConfig, PlannerError};

fn loader(backend: &Arc<MockBackend>) -> CurriculumLoader<MockBackend> {
    CurriculumLoader::new(
        Arc::clone(backend),
        Box::new(KeywordClassifier::default()),
        &PlannerConfig::default(),
    )
}

#[tokio::test]
async fn test_empty_student() {
    let backend = MockBackend::shared();
    let view = loader(&backend)
        .load(StudentId::from_value(1), None)
        .await
        .unwrap();

    assert!(view.is_empty());
    assert_eq!(view.progress().total_credits, 0);
    assert_eq!(view.progress().percent_advanced, 0.0);
}

#[tokio::test]
async fn test_groups_by_period_chain_in_order() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let later = backend.seed_semester(student, PeriodKey::new(2025, 1));
    let earlier = backend.seed_semester(student, PeriodKey::new(2024, 2));

    let a = backend.seed_course(student, later, "Cálculo II", 6, CourseState::Pending, None);
    let b = backend.seed_course(student, earlier, "Cálculo I", 6, CourseState::Approved, Some(5.0));
    let c = backend.seed_course(student, later, "Física II", 5, CourseState::InProgress, None);

    let view = loader(&backend).load(student, None).await.unwrap();

    let keys: Vec<PeriodKey> = view.buckets().map(|b| b.key()).collect();
    assert_eq!(keys, vec![PeriodKey::new(2024, 2), PeriodKey::new(2025, 1)]);
    assert_eq!(view.bucket(PeriodKey::new(2024, 2)).unwrap().course_ids(), &[b]);
    assert_eq!(view.bucket(PeriodKey::new(2025, 1)).unwrap().course_ids(), &[a, c]);
    assert_eq!(
        view.bucket(PeriodKey::new(2025, 1)).unwrap().enrollment(),
        Some(later)
    );
    assert!(view.is_partitioned());
    assert_eq!(view.progress().total_credits, 17);
    assert_eq!(view.progress().approved_credits, 6);
}

#[tokio::test]
async fn test_enrollment_without_courses_gets_empty_bucket() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let enrollment = backend.seed_semester(student, PeriodKey::new(2026, 1));

    let view = loader(&backend).load(student, None).await.unwrap();

    let bucket = view.bucket(PeriodKey::new(2026, 1)).unwrap();
    assert!(bucket.is_empty());
    assert_eq!(bucket.enrollment(), Some(enrollment));
}

#[tokio::test]
async fn test_unlabeled_courses_use_classifier() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let orphan = EnrollmentId::from_value(999);

    // Index 0 and 1 in the fetched list
    let calc = backend.seed_course(student, orphan, "Cálculo II", 6, CourseState::Pending, None);
    let elective = backend.seed_course(student, orphan, "Taller de Cine", 2, CourseState::Pending, None);

    let view = loader(&backend).load(student, None).await.unwrap();

    assert_eq!(view.locate(calc).map(|(k, _)| k), Some(PeriodKey::new(2025, 1)));
    assert_eq!(view.locate(elective).map(|(k, _)| k), Some(PeriodKey::new(2025, 2)));
}

#[tokio::test]
async fn test_filtered_load() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let first = backend.seed_semester(student, PeriodKey::new(2024, 1));
    let second = backend.seed_semester(student, PeriodKey::new(2024, 2));
    backend.seed_course(student, first, "Álgebra", 6, CourseState::Approved, Some(6.0));
    let wanted = backend.seed_course(student, second, "Química", 4, CourseState::Pending, None);

    let view = loader(&backend)
        .load(student, Some(PeriodKey::new(2024, 2)))
        .await
        .unwrap();

    assert_eq!(view.bucket_count(), 1);
    assert_eq!(view.len(), 1);
    assert!(view.course(wanted).is_some());
    assert_eq!(backend.calls(Op::ListCourses), 1);
}

#[tokio::test]
async fn test_filtered_load_falls_back_to_unfiltered_fetch() {
    let backend = MockBackend::shared();
    backend.disable_server_filter();
    let student = StudentId::from_value(1);
    let first = backend.seed_semester(student, PeriodKey::new(2024, 1));
    let second = backend.seed_semester(student, PeriodKey::new(2024, 2));
    backend.seed_course(student, first, "Álgebra", 6, CourseState::Approved, Some(6.0));
    let wanted = backend.seed_course(student, second, "Química", 4, CourseState::Pending, None);

    let view = loader(&backend)
        .load(student, Some(PeriodKey::new(2024, 2)))
        .await
        .unwrap();

    assert_eq!(backend.calls(Op::ListCourses), 2);
    assert_eq!(view.len(), 1);
    assert_eq!(view.locate(wanted), Some((PeriodKey::new(2024, 2), 0)));
    assert!(view.bucket(PeriodKey::new(2024, 1)).is_none());
}

#[tokio::test]
async fn test_duplicate_enrollment_is_reported() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let key = PeriodKey::new(2025, 1);
    let period = backend.seed_period(key);
    let first = backend.seed_enrollment(student, period);
    let second = backend.seed_enrollment(student, period);

    let view = loader(&backend).load(student, None).await.unwrap();

    assert_eq!(view.bucket_count(), 1);
    assert_eq!(
        view.duplicates(),
        &[DuplicateResource::Enrollment {
            key,
            ids: vec![first, second],
        }]
    );
}

#[tokio::test]
async fn test_placeholder_grade_does_not_block_load() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(1);
    let enrollment = backend.seed_semester(student, PeriodKey::new(2025, 1));
    backend.seed_course(student, enrollment, "Cálculo I", 6, CourseState::Approved, Some(5.5));
    let placeholder = backend.seed_course(student, enrollment, "Física I", 5, CourseState::Pending, Some(0.0));
    let zero_approved = backend.seed_course(student, enrollment, "Química", 4, CourseState::Approved, Some(0.0));

    let view = loader(&backend).load(student, None).await.unwrap();

    assert_eq!(view.len(), 3);
    assert_eq!(view.course(placeholder).unwrap().final_grade, Some(0.0));
    assert!(view.course(zero_approved).is_some());
    assert_eq!(view.progress().approved_credits, 10);
    assert_eq!(view.progress().mean_grade, 5.5);
}

#[tokio::test]
async fn test_load_failure() {
    let backend = MockBackend::shared();
    backend.fail(Op::ListCourses, true);

    let result = loader(&backend).load(StudentId::from_value(1), None).await;
    assert!(matches!(result, Err(PlannerError::Load(_))));
}
