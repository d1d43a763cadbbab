//! A student's first semester, from an empty record to an approved course

mod common;

use common::{MockBackend, Op};
use trayecto_domain::{CoursePatch, CourseState, PeriodKey, ProgressSnapshot, StudentId};
use trayecto_planner::{CourseDraft, PlannerConfig, ReassignmentCoordinator};

#[tokio::test]
async fn test_first_semester_progress() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(42);
    let planner = ReassignmentCoordinator::open(backend.clone(), student, &PlannerConfig::default())
        .await
        .unwrap();

    // Empty record
    assert!(planner.view().is_empty());
    assert_eq!(planner.progress(), ProgressSnapshot::default());

    // New semester with one pending 4-credit course
    let key = PeriodKey::new(2025, 1);
    planner.create_semester(key).await.unwrap();
    let course = planner
        .add_course(key, CourseDraft::new("INF101", "Introducción a la Programación", 4))
        .await
        .unwrap();

    let progress = planner.progress();
    assert_eq!(progress.total_credits, 4);
    assert_eq!(progress.approved_credits, 0);
    assert_eq!(progress.pending_credits, 4);
    assert_eq!(progress.percent_advanced, 0.0);

    // Approved with 5.5
    planner
        .update_course(
            course.id,
            CoursePatch {
                state: Some(CourseState::Approved),
                final_grade: Some(Some(5.5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let progress = planner.progress();
    assert_eq!(progress.total_credits, 4);
    assert_eq!(progress.approved_credits, 4);
    assert_eq!(progress.pending_credits, 0);
    assert_eq!(progress.percent_advanced, 100.0);
    assert_eq!(progress.mean_grade, 5.5);

    // The store agrees after a full reload
    planner.resync().await.unwrap();
    assert_eq!(planner.progress(), progress);
    assert_eq!(planner.view().locate(course.id), Some((key, 0)));
    assert_eq!(backend.calls(Op::CreatePeriod), 1);
    assert_eq!(backend.calls(Op::CreateEnrollment), 1);
}

#[tokio::test]
async fn test_mean_grade_ignores_ungraded_approvals() {
    let backend = MockBackend::shared();
    let student = StudentId::from_value(42);
    let enrollment = backend.seed_semester(student, PeriodKey::new(2024, 1));
    backend.seed_course(student, enrollment, "Álgebra", 6, CourseState::Approved, Some(6.0));
    backend.seed_course(student, enrollment, "Deportes", 2, CourseState::Approved, None);

    let planner = ReassignmentCoordinator::open(backend, student, &PlannerConfig::default())
        .await
        .unwrap();

    let progress = planner.progress();
    assert_eq!(progress.mean_grade, 6.0);
    assert_eq!(progress.approved_credits, 8);
    assert_eq!(progress.percent_advanced, 100.0);
}
