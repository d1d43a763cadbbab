//! HTTP client for the period, enrollment and course services.

use crate::error::SdkError;
use crate::wire::{
    CourseBody, CreateCourseBody, CreateEnrollmentBody, CreatePeriodBody, EnrollmentBody,
    PatchCourseBody, PeriodBody,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use trayecto_domain::{
    AcademicPeriod, CourseId, CoursePatch, CourseRecord, CurriculumBackend, NewCourse, PeriodId,
    PeriodKey, StudentId, StudentPeriodEnrollment,
};

/// Default timeout for a single HTTP request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trayecto SDK client
///
/// Carries the bearer token issued by the external auth service on every
/// request. The client never refreshes or validates the token itself.
#[derive(Debug, Clone)]
pub struct TrayectoClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl TrayectoClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SdkError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            http,
        })
    }

    /// Attach the session token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a session token is attached
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SdkError> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

async fn check_status(response: Response) -> Result<Response, SdkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().path().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SdkError::AuthError(format!("HTTP {} on {}", status, url))
        }
        StatusCode::NOT_FOUND => SdkError::NotFound(url),
        _ => SdkError::Http {
            status: status.as_u16(),
            body,
        },
    })
}

fn period_query(key: PeriodKey) -> [(&'static str, String); 2] {
    [("año", key.year.to_string()), ("semestre", key.term.to_string())]
}

impl CurriculumBackend for TrayectoClient {
    type Error = SdkError;

    async fn find_period(&self, key: PeriodKey) -> Result<Option<AcademicPeriod>, SdkError> {
        let builder = self
            .request(Method::GET, "/periodo-academico/periodos/buscar")
            .query(&period_query(key));

        match self.send::<PeriodBody>(builder).await {
            Ok(body) => Ok(Some(body.into())),
            Err(SdkError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_period(&self, key: PeriodKey) -> Result<AcademicPeriod, SdkError> {
        let builder = self
            .request(Method::POST, "/periodo-academico/periodos")
            .json(&CreatePeriodBody {
                year: key.year,
                term: key.term,
            });

        let body: PeriodBody = self.send(builder).await?;
        Ok(body.into())
    }

    async fn list_enrollments(
        &self,
        student: StudentId,
    ) -> Result<Vec<StudentPeriodEnrollment>, SdkError> {
        let path = format!("/periodo-academico/estudiante/{}", student);
        let bodies: Vec<EnrollmentBody> = self.send(self.request(Method::GET, &path)).await?;
        Ok(bodies.into_iter().map(Into::into).collect())
    }

    async fn create_enrollment(
        &self,
        student: StudentId,
        period: PeriodId,
    ) -> Result<StudentPeriodEnrollment, SdkError> {
        let builder = self
            .request(Method::POST, "/periodo-academico")
            .json(&CreateEnrollmentBody {
                estudiante_id: student.value(),
                periodo_academico_id: period.value(),
            });

        let body: EnrollmentBody = self.send(builder).await?;
        Ok(body.into())
    }

    async fn list_courses(
        &self,
        student: StudentId,
        filter: Option<PeriodKey>,
    ) -> Result<Vec<CourseRecord>, SdkError> {
        let path = format!("/ramos-cursados/estudiante/{}", student);
        let mut builder = self.request(Method::GET, &path);
        if let Some(key) = filter {
            builder = builder.query(&period_query(key));
        }

        let bodies: Vec<CourseBody> = self.send(builder).await?;
        bodies.into_iter().map(CourseRecord::try_from).collect()
    }

    async fn create_course(&self, course: NewCourse) -> Result<CourseRecord, SdkError> {
        let builder = self
            .request(Method::POST, "/ramos-cursados")
            .json(&CreateCourseBody::from(course));

        let body: CourseBody = self.send(builder).await?;
        CourseRecord::try_from(body)
    }

    async fn update_course(
        &self,
        id: CourseId,
        patch: CoursePatch,
    ) -> Result<CourseRecord, SdkError> {
        let path = format!("/ramos-cursados/{}", id);
        let builder = self
            .request(Method::PATCH, &path)
            .json(&PatchCourseBody::from(patch));

        let body: CourseBody = self.send(builder).await?;
        CourseRecord::try_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TrayectoClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert!(!client.has_token());
        assert_eq!(
            client.url("/ramos-cursados/1"),
            "http://localhost:3000/api/ramos-cursados/1"
        );
    }

    #[test]
    fn test_with_token() {
        let client = TrayectoClient::new("http://localhost:3000")
            .unwrap()
            .with_token("abc");
        assert!(client.has_token());
    }

    #[test]
    fn test_period_query() {
        let query = period_query(PeriodKey::new(2025, 2));
        assert_eq!(query[0], ("año", "2025".to_string()));
        assert_eq!(query[1], ("semestre", "2".to_string()));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let client = TrayectoClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2))
            .unwrap();

        let result = client.find_period(PeriodKey::new(2025, 1)).await;
        match result {
            Err(SdkError::ConnectionError(_)) | Err(SdkError::Timeout) | Err(SdkError::Request(_)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }
}
