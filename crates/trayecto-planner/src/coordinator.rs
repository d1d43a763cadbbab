//! Optimistic curriculum edits reconciled against the store
//!
//! Every user edit is applied to the local view first so progress figures
//! update immediately, then written to the store. A move walks the per-course
//! state machine `Idle -> Moving -> {Confirmed, RolledBack}`. Whatever the
//! outcome, the view is reconciled with the store before the call returns;
//! if the store cannot be reached the optimistic change is undone locally.

use crate::loader::CurriculumLoader;
use crate::retry::StepPolicy;
use crate::{EnrollmentLinker, PeriodRegistry, PlannerConfig, PlannerError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::Instrument;
use trayecto_domain::{
    CourseId, CoursePatch, CourseRecord, CourseState, CurriculumBackend, CurriculumView,
    EnrollmentId, FallbackClassifier, KeywordClassifier, MoveOutcome, NewCourse, PeriodKey,
    ProgressSnapshot, StudentId, ViewError,
};
use uuid::Uuid;

/// Where a course is in its reassignment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveState {
    /// No move has run, or the last one never left the view
    #[default]
    Idle,
    /// Remote reassignment in progress
    Moving,
    /// The store accepted the last move
    Confirmed,
    /// The last move failed and was reconciled
    RolledBack,
}

impl MoveState {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveState::Idle => "idle",
            MoveState::Moving => "moving",
            MoveState::Confirmed => "confirmed",
            MoveState::RolledBack => "rolled-back",
        }
    }
}

/// What a successful [`ReassignmentCoordinator::move_course`] did
#[derive(Debug, Clone, PartialEq)]
pub struct MoveReport {
    /// Operation id carried in log spans
    pub op_id: Uuid,
    /// The course moved
    pub course: CourseId,
    /// Origin semester
    pub from: PeriodKey,
    /// Destination semester
    pub to: PeriodKey,
    /// Local effect on the view
    pub outcome: MoveOutcome,
    /// Final state of the course
    pub state: MoveState,
    /// Enrollment the course now belongs to, when it changed semester
    pub enrollment: Option<EnrollmentId>,
}

/// Fields of a course to create; the enrollment is resolved from the semester
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    /// Course code
    pub code: String,
    /// Display name
    pub name: String,
    /// Credit weight
    pub credits: u32,
    /// Initial state
    pub state: CourseState,
    /// Final grade, if already known
    pub final_grade: Option<f64>,
    /// Attempt number
    pub attempt: u32,
}

impl CourseDraft {
    /// A pending, ungraded first attempt
    pub fn new(code: impl Into<String>, name: impl Into<String>, credits: u32) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            credits,
            state: CourseState::Pending,
            final_grade: None,
            attempt: 1,
        }
    }

    fn into_new_course(self, student: StudentId, enrollment: EnrollmentId) -> NewCourse {
        NewCourse {
            student,
            enrollment,
            code: self.code,
            name: self.name,
            state: self.state,
            final_grade: self.final_grade,
            attempt: self.attempt,
            credits: self.credits,
        }
    }
}

/// Controller for one student's curriculum session
///
/// View access goes through a mutex that is never held across an await, so
/// moves of different courses interleave freely.
pub struct ReassignmentCoordinator<B> {
    backend: Arc<B>,
    student: StudentId,
    registry: PeriodRegistry<B>,
    linker: EnrollmentLinker<B>,
    loader: CurriculumLoader<B>,
    policy: StepPolicy,
    view: Mutex<CurriculumView>,
    states: Mutex<HashMap<CourseId, MoveState>>,
}

impl<B: CurriculumBackend> ReassignmentCoordinator<B> {
    /// Create a coordinator with an empty view and the keyword classifier
    pub fn new(backend: Arc<B>, student: StudentId, config: &PlannerConfig) -> Self {
        Self::with_classifier(
            backend,
            student,
            config,
            Box::new(KeywordClassifier::new(config.anchor_year)),
        )
    }

    /// Create a coordinator with a custom fallback classifier
    pub fn with_classifier(
        backend: Arc<B>,
        student: StudentId,
        config: &PlannerConfig,
        classifier: Box<dyn FallbackClassifier>,
    ) -> Self {
        Self {
            registry: PeriodRegistry::new(Arc::clone(&backend), config),
            linker: EnrollmentLinker::new(Arc::clone(&backend), config),
            loader: CurriculumLoader::new(Arc::clone(&backend), classifier, config),
            policy: StepPolicy::from_config(config),
            backend,
            student,
            view: Mutex::new(CurriculumView::new(student)),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Create a coordinator and load the student's curriculum
    pub async fn open(
        backend: Arc<B>,
        student: StudentId,
        config: &PlannerConfig,
    ) -> Result<Self, PlannerError> {
        let coordinator = Self::new(backend, student, config);
        coordinator.resync().await?;
        Ok(coordinator)
    }

    /// The student this session edits
    pub fn student(&self) -> StudentId {
        self.student
    }

    /// The loader used by [`resync`](Self::resync)
    pub fn loader(&self) -> &CurriculumLoader<B> {
        &self.loader
    }

    /// Snapshot of the current view
    pub fn view(&self) -> CurriculumView {
        self.lock_view().clone()
    }

    /// Current progress figures
    pub fn progress(&self) -> ProgressSnapshot {
        *self.lock_view().progress()
    }

    /// Lifecycle state of a course's latest move
    pub fn move_state(&self, course: CourseId) -> MoveState {
        self.lock_states().get(&course).copied().unwrap_or_default()
    }

    /// Duplicate periods or enrollments found by the last load
    pub fn warnings(&self) -> Vec<PlannerError> {
        self.lock_view()
            .duplicates()
            .iter()
            .cloned()
            .map(PlannerError::DuplicateResourceDetected)
            .collect()
    }

    /// Replace the view with a fresh load from the store
    pub async fn resync(&self) -> Result<(), PlannerError> {
        let op_id = Uuid::now_v7();
        let span = tracing::debug_span!("resync", %op_id, student = %self.student);
        self.reload().instrument(span).await
    }

    async fn reload(&self) -> Result<(), PlannerError> {
        let view = self.loader.load(self.student, None).await?;
        *self.lock_view() = view;
        tracing::debug!("View reconciled with store");
        Ok(())
    }

    /// Move a course to `to`, at `target_index` (appended when `None`)
    ///
    /// A move within the same semester only reorders the view. A move to
    /// another semester resolves the destination period and enrollment and
    /// re-points the course there, keeping its state, grade and attempt.
    ///
    /// # Errors
    ///
    /// `MoveInFlight` if this course is already moving. Any resolution,
    /// timeout or update failure is returned after the view has been
    /// reconciled, with the course back in its origin semester.
    pub async fn move_course(
        &self,
        course: CourseId,
        to: PeriodKey,
        target_index: Option<usize>,
    ) -> Result<MoveReport, PlannerError> {
        let op_id = Uuid::now_v7();
        let span = tracing::info_span!("move_course", %op_id, %course, %to);
        self.run_move(op_id, course, to, target_index)
            .instrument(span)
            .await
    }

    async fn run_move(
        &self,
        op_id: Uuid,
        course: CourseId,
        to: PeriodKey,
        target_index: Option<usize>,
    ) -> Result<MoveReport, PlannerError> {
        let (from, from_index) = self
            .lock_view()
            .locate(course)
            .ok_or(ViewError::UnknownCourse(course))?;
        let index = target_index.unwrap_or(usize::MAX);

        if from == to {
            let outcome = self.lock_view().move_course(course, from, to, index)?;
            tracing::debug!(?outcome, "Local reorder");
            return Ok(MoveReport {
                op_id,
                course,
                from,
                to,
                outcome,
                state: self.move_state(course),
                enrollment: None,
            });
        }

        let mut flight = self.begin_move(course)?;
        let outcome = self.lock_view().move_course(course, from, to, index)?;
        let created_bucket = matches!(
            outcome,
            MoveOutcome::Moved {
                created_bucket: true,
                ..
            }
        );

        match self.reassign_remote(course, to).await {
            Ok(record) => {
                flight.finish(MoveState::Confirmed);
                let enrollment = record.enrollment;
                tracing::info!(%from, %enrollment, "Move confirmed");

                if let Err(e) = self.resync().await {
                    tracing::warn!(error = %e, "Resync after confirmed move failed, keeping local view");
                    if let Err(e) = self.lock_view().replace_course(record) {
                        tracing::warn!(error = %e, "Could not apply confirmed record");
                    }
                }

                Ok(MoveReport {
                    op_id,
                    course,
                    from,
                    to,
                    outcome,
                    state: MoveState::Confirmed,
                    enrollment: Some(enrollment),
                })
            }
            Err(err) => {
                flight.finish(MoveState::RolledBack);
                tracing::warn!(%from, error = %err, "Move failed, reconciling view");

                if let Err(resync_err) = self.resync().await {
                    tracing::warn!(error = %resync_err, "Resync failed, undoing move locally");
                    self.undo_move(course, from, to, from_index, created_bucket);
                }
                Err(err)
            }
        }
    }

    async fn reassign_remote(
        &self,
        course: CourseId,
        to: PeriodKey,
    ) -> Result<CourseRecord, PlannerError> {
        let enrollment = self.resolve_semester(to).await?;

        let patch = {
            let mut view = self.lock_view();
            view.add_bucket(to, Some(enrollment));
            let current = view
                .course(course)
                .ok_or(ViewError::UnknownCourse(course))?;
            CoursePatch {
                state: Some(current.state),
                final_grade: Some(current.final_grade),
                attempt: Some(current.attempt),
                enrollment: Some(enrollment),
            }
        };

        self.update_remote(course, patch).await
    }

    fn undo_move(
        &self,
        course: CourseId,
        from: PeriodKey,
        to: PeriodKey,
        from_index: usize,
        created_bucket: bool,
    ) {
        let mut view = self.lock_view();
        match view.move_course(course, to, from, from_index) {
            Ok(_) => {
                if created_bucket {
                    view.remove_empty_bucket(to);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not undo move"),
        }
    }

    /// Create a semester: resolve its period and the student's enrollment,
    /// then add an empty bucket
    pub async fn create_semester(&self, key: PeriodKey) -> Result<EnrollmentId, PlannerError> {
        let op_id = Uuid::now_v7();
        let span = tracing::info_span!("create_semester", %op_id, %key);
        async {
            let enrollment = self.resolve_semester(key).await?;
            self.lock_view().add_bucket(key, Some(enrollment));
            tracing::info!(%enrollment, "Semester ready");
            Ok::<_, PlannerError>(enrollment)
        }
        .instrument(span)
        .await
    }

    async fn resolve_semester(&self, key: PeriodKey) -> Result<EnrollmentId, PlannerError> {
        let period = self.registry.resolve_period(key).await?;
        self.linker.resolve_enrollment(self.student, period).await
    }

    /// Create a course in a semester and add it to the view
    ///
    /// The course has no id until the store assigns one, so it is inserted
    /// only after the create succeeds.
    pub async fn add_course(
        &self,
        key: PeriodKey,
        draft: CourseDraft,
    ) -> Result<CourseRecord, PlannerError> {
        let op_id = Uuid::now_v7();
        let span = tracing::info_span!("add_course", %op_id, %key, code = %draft.code);
        self.create_course(key, draft).instrument(span).await
    }

    async fn create_course(
        &self,
        key: PeriodKey,
        draft: CourseDraft,
    ) -> Result<CourseRecord, PlannerError> {
        validate_draft(&draft)?;
        let enrollment = self.resolve_semester(key).await?;

        let new_course = draft.into_new_course(self.student, enrollment);
        let backend = &*self.backend;
        let mut record = self
            .policy
            .run("create_course", move || {
                backend.create_course(new_course.clone())
            })
            .await
            .map_err(|e| {
                e.into_planner(|reason| PlannerError::RemoteUpdateFailed {
                    course: None,
                    reason,
                })
            })?;

        record.period.get_or_insert(key);
        {
            let mut view = self.lock_view();
            view.add_bucket(key, Some(enrollment));
            match view.add_course(key, record.clone()) {
                Ok(()) => {}
                // A reload landed while the create was in flight
                Err(ViewError::DuplicateCourse(id)) if id == record.id => {
                    tracing::debug!(course = %id, "Created course already in view");
                    view.replace_course(record.clone())?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        tracing::info!(course = %record.id, "Course created");
        Ok(record)
    }

    /// Edit a course's state, grade or attempt
    ///
    /// Applied to the view first; on failure the view is reconciled with the
    /// store, or restored locally if the store is unreachable.
    pub async fn update_course(
        &self,
        course: CourseId,
        patch: CoursePatch,
    ) -> Result<CourseRecord, PlannerError> {
        let op_id = Uuid::now_v7();
        let span = tracing::info_span!("update_course", %op_id, %course);
        self.edit_course(course, patch).instrument(span).await
    }

    async fn edit_course(
        &self,
        course: CourseId,
        patch: CoursePatch,
    ) -> Result<CourseRecord, PlannerError> {
        if patch.enrollment.is_some() {
            return Err(ViewError::InvalidCourse(
                "semester changes go through move_course".to_string(),
            )
            .into());
        }

        let previous = {
            let mut view = self.lock_view();
            let previous = view
                .course(course)
                .cloned()
                .ok_or(ViewError::UnknownCourse(course))?;
            view.update_course(course, &patch)?;
            previous
        };

        match self.update_remote(course, patch).await {
            Ok(record) => {
                if let Err(e) = self.lock_view().replace_course(record.clone()) {
                    tracing::warn!(error = %e, "Could not apply updated record");
                }
                tracing::info!(state = record.state.as_str(), "Course updated");
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Course update failed, reconciling view");
                if let Err(resync_err) = self.resync().await {
                    tracing::warn!(error = %resync_err, "Resync failed, restoring course locally");
                    if let Err(e) = self.lock_view().replace_course(previous) {
                        tracing::warn!(error = %e, "Could not restore course");
                    }
                }
                Err(err)
            }
        }
    }

    async fn update_remote(
        &self,
        course: CourseId,
        patch: CoursePatch,
    ) -> Result<CourseRecord, PlannerError> {
        let backend = &*self.backend;
        self.policy
            .run("update_course", move || {
                backend.update_course(course, patch.clone())
            })
            .await
            .map_err(|e| {
                e.into_planner(|reason| PlannerError::RemoteUpdateFailed {
                    course: Some(course),
                    reason,
                })
            })
    }

    fn begin_move(&self, course: CourseId) -> Result<MoveFlight<'_>, PlannerError> {
        let mut states = self.lock_states();
        if states.get(&course) == Some(&MoveState::Moving) {
            return Err(PlannerError::MoveInFlight(course));
        }
        states.insert(course, MoveState::Moving);
        Ok(MoveFlight {
            states: &self.states,
            course,
            finished: None,
        })
    }

    fn lock_view(&self) -> MutexGuard<'_, CurriculumView> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_states(&self) -> MutexGuard<'_, HashMap<CourseId, MoveState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a course as moving until dropped
///
/// A flight dropped without [`finish`](Self::finish) (the move errored
/// locally or its future was dropped) leaves the course `Idle`.
struct MoveFlight<'a> {
    states: &'a Mutex<HashMap<CourseId, MoveState>>,
    course: CourseId,
    finished: Option<MoveState>,
}

impl MoveFlight<'_> {
    fn finish(&mut self, state: MoveState) {
        self.finished = Some(state);
    }
}

impl Drop for MoveFlight<'_> {
    fn drop(&mut self) {
        let state = self.finished.unwrap_or(MoveState::Idle);
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.course, state);
    }
}

fn validate_draft(draft: &CourseDraft) -> Result<(), PlannerError> {
    if let Some(grade) = draft.final_grade {
        trayecto_domain::course::validate_grade(grade).map_err(ViewError::InvalidCourse)?;
    }
    if draft.attempt == 0 {
        return Err(ViewError::InvalidCourse("Attempt number must be at least 1".to_string()).into());
    }
    Ok(())
}
