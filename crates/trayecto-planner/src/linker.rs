//! Find-or-create resolution of student enrollments

use crate::retry::StepPolicy;
use crate::single_flight::KeyedLocks;
use crate::{PlannerConfig, PlannerError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use trayecto_domain::{CurriculumBackend, EnrollmentId, PeriodId, StudentId};

/// Resolves (student, period) to the student's enrollment, creating it if
/// needed
///
/// The store has no lookup by (student, period), so the student's enrollments
/// are listed and matched here. Same single-flight and memoization rules as
/// [`PeriodRegistry`](crate::PeriodRegistry).
pub struct EnrollmentLinker<B> {
    backend: Arc<B>,
    policy: StepPolicy,
    locks: KeyedLocks<(StudentId, PeriodId)>,
    resolved: Mutex<HashMap<(StudentId, PeriodId), EnrollmentId>>,
}

impl<B: CurriculumBackend> EnrollmentLinker<B> {
    /// Create a linker over a backend
    pub fn new(backend: Arc<B>, config: &PlannerConfig) -> Self {
        Self {
            backend,
            policy: StepPolicy::from_config(config),
            locks: KeyedLocks::default(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Enrollment already resolved for (student, period), if any
    pub fn cached(&self, student: StudentId, period: PeriodId) -> Option<EnrollmentId> {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(student, period))
            .copied()
    }

    /// Find the student's enrollment in `period`, enrolling them if absent
    ///
    /// When several enrollments match, the lowest id wins.
    ///
    /// # Errors
    ///
    /// `EnrollmentResolutionFailed` when neither listing nor create produced
    /// an enrollment.
    pub async fn resolve_enrollment(
        &self,
        student: StudentId,
        period: PeriodId,
    ) -> Result<EnrollmentId, PlannerError> {
        if let Some(id) = self.cached(student, period) {
            return Ok(id);
        }

        let _flight = self.locks.lock((student, period)).await;
        if let Some(id) = self.cached(student, period) {
            return Ok(id);
        }

        let backend = &*self.backend;
        let listing = self
            .policy
            .run("list_enrollments", move || backend.list_enrollments(student))
            .await;

        let list_failure = match listing {
            Ok(enrollments) => {
                let existing = enrollments
                    .iter()
                    .filter(|e| e.period == period)
                    .map(|e| e.id)
                    .min();
                if let Some(id) = existing {
                    tracing::debug!(%student, %period, enrollment = %id, "Found existing enrollment");
                    self.remember(student, period, id);
                    return Ok(id);
                }
                "not enrolled".to_string()
            }
            Err(e) => {
                tracing::warn!(%student, %period, error = %e, "Enrollment listing failed, attempting create");
                e.to_string()
            }
        };

        match self
            .policy
            .run("create_enrollment", move || {
                backend.create_enrollment(student, period)
            })
            .await
        {
            Ok(enrollment) => {
                tracing::info!(%student, %period, enrollment = %enrollment.id, "Created enrollment");
                self.remember(student, period, enrollment.id);
                Ok(enrollment.id)
            }
            Err(e) => Err(PlannerError::EnrollmentResolutionFailed {
                student,
                period,
                reason: format!("list: {}; create: {}", list_failure, e),
            }),
        }
    }

    fn remember(&self, student: StudentId, period: PeriodId, id: EnrollmentId) {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((student, period), id);
    }
}
