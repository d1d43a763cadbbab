//! Builds a curriculum view from the store

use crate::retry::StepPolicy;
use crate::{PlannerConfig, PlannerError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use trayecto_domain::course::validate_grade;
use trayecto_domain::{
    CourseRecord, CurriculumBackend, CurriculumView, DuplicateResource, EnrollmentId,
    FallbackClassifier, PeriodId, PeriodKey, StudentId, StudentPeriodEnrollment,
};

/// Fetches a student's courses and enrollments and groups them into a view
pub struct CurriculumLoader<B> {
    backend: Arc<B>,
    classifier: Box<dyn FallbackClassifier>,
    policy: StepPolicy,
}

impl<B: CurriculumBackend> CurriculumLoader<B> {
    /// Create a loader that places unlabeled courses with `classifier`
    pub fn new(
        backend: Arc<B>,
        classifier: Box<dyn FallbackClassifier>,
        config: &PlannerConfig,
    ) -> Self {
        Self {
            backend,
            classifier,
            policy: StepPolicy::from_config(config),
        }
    }

    /// Load the student's curriculum, optionally restricted to one semester
    ///
    /// Courses are placed by their embedded (year, term), else by their
    /// enrollment's (year, term), else by the fallback classifier. Every
    /// enrollment gets a bucket even without courses. Duplicate periods or
    /// enrollments for one (year, term) are logged and recorded on the view.
    pub async fn load(
        &self,
        student: StudentId,
        filter: Option<PeriodKey>,
    ) -> Result<CurriculumView, PlannerError> {
        let mut courses = self.fetch_courses(student, filter).await?;
        let mut refetched = false;

        if filter.is_some() && courses.is_empty() {
            tracing::debug!(%student, "Filtered course fetch came back empty, refetching all");
            courses = self.fetch_courses(student, None).await?;
            refetched = true;
        }

        let backend = &*self.backend;
        let enrollments = self
            .policy
            .run("list_enrollments", move || backend.list_enrollments(student))
            .await
            .map_err(|e| e.into_planner(PlannerError::Load))?;

        let enrollment_keys: HashMap<EnrollmentId, PeriodKey> = enrollments
            .iter()
            .filter_map(|e| e.period_key.map(|key| (e.id, key)))
            .collect();

        let mut view = CurriculumView::new(student);
        for (index, course) in courses.into_iter().enumerate() {
            let key = self.place(&course, index, &enrollment_keys);
            if refetched && Some(key) != filter {
                continue;
            }
            if let Some(grade) = course.final_grade {
                if let Err(reason) = validate_grade(grade) {
                    tracing::warn!(course = %course.id, %reason, "Stored grade left out of the mean");
                }
            }
            if let Err(e) = view.add_course(key, course) {
                tracing::warn!(%student, error = %e, "Course record skipped");
            }
        }

        for enrollment in &enrollments {
            match enrollment.period_key {
                Some(key) if filter.is_none_or(|f| f == key) => {
                    if view.bucket(key).is_none() {
                        view.add_bucket(key, Some(enrollment.id));
                    }
                }
                Some(_) => {}
                None => {
                    tracing::debug!(enrollment = %enrollment.id, "Enrollment without period details skipped");
                }
            }
        }

        let duplicates = find_duplicates(&enrollments);
        for duplicate in &duplicates {
            tracing::warn!(%student, "Duplicate resource: {}", duplicate);
        }
        view.record_duplicates(duplicates);

        tracing::debug!(
            %student,
            courses = view.len(),
            buckets = view.bucket_count(),
            "Curriculum loaded"
        );
        Ok(view)
    }

    async fn fetch_courses(
        &self,
        student: StudentId,
        filter: Option<PeriodKey>,
    ) -> Result<Vec<CourseRecord>, PlannerError> {
        let backend = &*self.backend;
        self.policy
            .run("list_courses", move || backend.list_courses(student, filter))
            .await
            .map_err(|e| e.into_planner(PlannerError::Load))
    }

    fn place(
        &self,
        course: &CourseRecord,
        index: usize,
        enrollment_keys: &HashMap<EnrollmentId, PeriodKey>,
    ) -> PeriodKey {
        course
            .period
            .or_else(|| enrollment_keys.get(&course.enrollment).copied())
            .unwrap_or_else(|| {
                let key = self.classifier.classify(&course.name, index);
                tracing::debug!(course = %course.id, %key, "Placed course by classifier");
                key
            })
    }
}

/// Period ids and enrollment ids sharing one (year, term)
fn find_duplicates(enrollments: &[StudentPeriodEnrollment]) -> Vec<DuplicateResource> {
    let mut periods: BTreeMap<PeriodKey, BTreeSet<PeriodId>> = BTreeMap::new();
    let mut linked: BTreeMap<PeriodKey, BTreeSet<EnrollmentId>> = BTreeMap::new();

    for enrollment in enrollments {
        if let Some(key) = enrollment.period_key {
            periods.entry(key).or_default().insert(enrollment.period);
            linked.entry(key).or_default().insert(enrollment.id);
        }
    }

    let mut duplicates = Vec::new();
    for (key, ids) in periods {
        if ids.len() > 1 {
            duplicates.push(DuplicateResource::Period {
                key,
                ids: ids.into_iter().collect(),
            });
        }
    }
    for (key, ids) in linked {
        if ids.len() > 1 {
            duplicates.push(DuplicateResource::Enrollment {
                key,
                ids: ids.into_iter().collect(),
            });
        }
    }
    duplicates
}
