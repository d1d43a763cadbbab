//! In-memory curriculum store with failure injection

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use trayecto_domain::{
    AcademicPeriod, CourseId, CoursePatch, CourseRecord, CourseState, CurriculumBackend,
    EnrollmentId, NewCourse, PeriodId, PeriodKey, StudentId, StudentPeriodEnrollment,
};

#[derive(Debug, Error)]
#[error("mock store: {0}")]
pub struct MockError(pub String);

/// Operations that can be made to fail or hang
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    FindPeriod,
    CreatePeriod,
    ListEnrollments,
    CreateEnrollment,
    ListCourses,
    CreateCourse,
    UpdateCourse,
}

#[derive(Default)]
struct Data {
    next_id: i64,
    periods: Vec<AcademicPeriod>,
    enrollments: Vec<StudentPeriodEnrollment>,
    courses: Vec<(StudentId, CourseRecord)>,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn period_key(&self, period: PeriodId) -> Option<PeriodKey> {
        self.periods.iter().find(|p| p.id == period).map(|p| p.key)
    }

    fn enrollment_key(&self, enrollment: EnrollmentId) -> Option<PeriodKey> {
        self.enrollments
            .iter()
            .find(|e| e.id == enrollment)
            .and_then(|e| self.period_key(e.period))
    }

    fn with_chain(&self, course: &CourseRecord) -> CourseRecord {
        let mut course = course.clone();
        course.period = self.enrollment_key(course.enrollment);
        course
    }
}

/// Store that keeps everything in memory
#[derive(Default)]
pub struct MockBackend {
    data: Mutex<Data>,
    failing: Mutex<HashMap<Op, bool>>,
    hanging: Mutex<HashMap<Op, bool>>,
    calls: Mutex<HashMap<Op, usize>>,
    gate: Mutex<Option<Arc<Notify>>>,
    create_pause: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
    no_server_filter: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every call of `op` fail (or succeed again)
    pub fn fail(&self, op: Op, failing: bool) {
        self.failing.lock().unwrap().insert(op, failing);
    }

    /// Make every call of `op` sleep far past any deadline
    pub fn hang(&self, op: Op, hanging: bool) {
        self.hanging.lock().unwrap().insert(op, hanging);
    }

    /// Make the next `find_period` wait until the returned handle is notified
    pub fn gate_find_period(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Make the next `create_course` stop after storing the course
    ///
    /// Returns `(committed, release)`: `committed` is notified once the
    /// course is stored, and the call returns after `release` is notified.
    pub fn pause_after_create_course(&self) -> (Arc<Notify>, Arc<Notify>) {
        let committed = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.create_pause.lock().unwrap() = Some((Arc::clone(&committed), Arc::clone(&release)));
        (committed, release)
    }

    /// Ignore the server-side period filter and return nothing for it
    pub fn disable_server_filter(&self) {
        self.no_server_filter.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    pub fn period_count(&self, key: PeriodKey) -> usize {
        self.data
            .lock()
            .unwrap()
            .periods
            .iter()
            .filter(|p| p.key == key)
            .count()
    }

    pub fn enrollment_count(&self, student: StudentId) -> usize {
        self.data
            .lock()
            .unwrap()
            .enrollments
            .iter()
            .filter(|e| e.student == student)
            .count()
    }

    pub fn stored_course(&self, id: CourseId) -> Option<CourseRecord> {
        let data = self.data.lock().unwrap();
        data.courses
            .iter()
            .find(|(_, c)| c.id == id)
            .map(|(_, c)| data.with_chain(c))
    }

    pub fn seed_period(&self, key: PeriodKey) -> PeriodId {
        let mut data = self.data.lock().unwrap();
        let id = PeriodId::from_value(data.next_id());
        data.periods.push(AcademicPeriod {
            id,
            key,
            current: false,
        });
        id
    }

    pub fn seed_enrollment(&self, student: StudentId, period: PeriodId) -> EnrollmentId {
        let mut data = self.data.lock().unwrap();
        let id = EnrollmentId::from_value(data.next_id());
        let mut enrollment = StudentPeriodEnrollment::new(id, student, period);
        enrollment.period_key = data.period_key(period);
        data.enrollments.push(enrollment);
        id
    }

    /// Seed a period, enroll the student in it and return the enrollment
    pub fn seed_semester(&self, student: StudentId, key: PeriodKey) -> EnrollmentId {
        let period = self.seed_period(key);
        self.seed_enrollment(student, period)
    }

    pub fn seed_course(
        &self,
        student: StudentId,
        enrollment: EnrollmentId,
        name: &str,
        credits: u32,
        state: CourseState,
        grade: Option<f64>,
    ) -> CourseId {
        let mut data = self.data.lock().unwrap();
        let id = CourseId::from_value(data.next_id());
        let mut course = CourseRecord::new(id, format!("C{}", id), name, enrollment, credits)
            .with_state(state);
        course.final_grade = grade;
        data.courses.push((student, course));
        id
    }

    async fn enter(&self, op: Op) -> Result<(), MockError> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;

        if op == Op::FindPeriod {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
        }

        let hanging = self.hanging.lock().unwrap().get(&op).copied().unwrap_or(false);
        if hanging {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        let failing = self.failing.lock().unwrap().get(&op).copied().unwrap_or(false);
        if failing {
            return Err(MockError(format!("{:?} failed", op)));
        }
        Ok(())
    }
}

impl CurriculumBackend for MockBackend {
    type Error = MockError;

    async fn find_period(&self, key: PeriodKey) -> Result<Option<AcademicPeriod>, MockError> {
        self.enter(Op::FindPeriod).await?;
        let data = self.data.lock().unwrap();
        Ok(data.periods.iter().find(|p| p.key == key).cloned())
    }

    async fn create_period(&self, key: PeriodKey) -> Result<AcademicPeriod, MockError> {
        self.enter(Op::CreatePeriod).await?;
        let id = self.seed_period(key);
        Ok(AcademicPeriod {
            id,
            key,
            current: false,
        })
    }

    async fn list_enrollments(
        &self,
        student: StudentId,
    ) -> Result<Vec<StudentPeriodEnrollment>, MockError> {
        self.enter(Op::ListEnrollments).await?;
        let data = self.data.lock().unwrap();
        Ok(data
            .enrollments
            .iter()
            .filter(|e| e.student == student)
            .cloned()
            .collect())
    }

    async fn create_enrollment(
        &self,
        student: StudentId,
        period: PeriodId,
    ) -> Result<StudentPeriodEnrollment, MockError> {
        self.enter(Op::CreateEnrollment).await?;
        let id = self.seed_enrollment(student, period);
        let data = self.data.lock().unwrap();
        data.enrollments
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| MockError("enrollment vanished".to_string()))
    }

    async fn list_courses(
        &self,
        student: StudentId,
        filter: Option<PeriodKey>,
    ) -> Result<Vec<CourseRecord>, MockError> {
        self.enter(Op::ListCourses).await?;
        if filter.is_some() && self.no_server_filter.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let data = self.data.lock().unwrap();
        Ok(data
            .courses
            .iter()
            .filter(|(s, _)| *s == student)
            .map(|(_, c)| data.with_chain(c))
            .filter(|c| filter.is_none() || c.period == filter)
            .collect())
    }

    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, MockError> {
        self.enter(Op::CreateCourse).await?;
        let stored = {
            let mut data = self.data.lock().unwrap();
            let id = CourseId::from_value(data.next_id());
            let record = CourseRecord {
                id,
                code: course.code,
                name: course.name,
                enrollment: course.enrollment,
                period: None,
                state: course.state,
                final_grade: course.final_grade,
                attempt: course.attempt,
                credits: course.credits,
            };
            data.courses.push((course.student, record.clone()));
            data.with_chain(&record)
        };

        let pause = self.create_pause.lock().unwrap().take();
        if let Some((committed, release)) = pause {
            committed.notify_one();
            release.notified().await;
        }
        Ok(stored)
    }

    async fn update_course(
        &self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<CourseRecord, MockError> {
        self.enter(Op::UpdateCourse).await?;
        let mut data = self.data.lock().unwrap();
        let slot = data
            .courses
            .iter_mut()
            .find(|(_, c)| c.id == id)
            .ok_or_else(|| MockError(format!("no course {}", id)))?;
        patch.apply(&mut slot.1);
        let updated = slot.1.clone();
        Ok(data.with_chain(&updated))
    }
}
