//! JSON bodies exchanged with the student-records services.
//!
//! Field names follow the services' Spanish schema (`año`, `semestre`,
//! `ramos-cursados`, ...). Conversions to and from domain types live here so
//! the client only deals with HTTP.

use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use trayecto_domain::{
    AcademicPeriod, CourseId, CoursePatch, CourseRecord, CourseState, EnrollmentId, NewCourse,
    PeriodId, PeriodKey, StudentId, StudentPeriodEnrollment,
};

/// Academic period as returned by the period service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodBody {
    /// Period id
    pub id: i64,
    /// Year
    #[serde(rename = "año")]
    pub year: i32,
    /// Term
    #[serde(rename = "semestre")]
    pub term: u8,
    /// Current-period flag
    #[serde(rename = "actual", default)]
    pub current: bool,
}

/// Body of `POST /periodo-academico/periodos`
#[derive(Debug, Serialize)]
pub struct CreatePeriodBody {
    /// Year
    #[serde(rename = "año")]
    pub year: i32,
    /// Term
    #[serde(rename = "semestre")]
    pub term: u8,
}

/// Student enrollment as returned by the period service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentBody {
    /// Enrollment id
    pub id: i64,
    /// Student id
    pub estudiante_id: i64,
    /// Period id
    pub periodo_academico_id: i64,
    /// Start date
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    /// End date
    #[serde(default)]
    pub fecha_fin: Option<String>,
    /// Currently-enrolled flag
    #[serde(default)]
    pub activo: bool,
    /// Notes
    #[serde(default)]
    pub observaciones: Option<String>,
    /// Embedded period, when the service joins it
    #[serde(default)]
    pub periodo_academico: Option<PeriodBody>,
}

/// Body of `POST /periodo-academico`
#[derive(Debug, Serialize)]
pub struct CreateEnrollmentBody {
    /// Student id
    pub estudiante_id: i64,
    /// Period id
    pub periodo_academico_id: i64,
}

/// Enrollment embedded in a course record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedEnrollmentBody {
    /// Enrollment id
    pub id: i64,
    /// Embedded period
    #[serde(default)]
    pub periodo_academico: Option<PeriodBody>,
}

/// Course record as returned by the course service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseBody {
    /// Course id
    pub id: i64,
    /// Student id
    #[serde(default)]
    pub id_estudiante: Option<i64>,
    /// Owning enrollment id
    pub periodo_academico_estudiante_id: i64,
    /// Course code
    pub codigo_ramo: String,
    /// Course name
    pub nombre_ramo: String,
    /// Wire state
    pub estado: String,
    /// Final grade
    #[serde(default)]
    pub promedio_final: Option<f64>,
    /// Attempt number
    #[serde(default = "default_attempt")]
    pub oportunidad: u32,
    /// Credit weight
    #[serde(default)]
    pub creditos: u32,
    /// Embedded enrollment/period chain
    #[serde(default)]
    pub periodo_academico_estudiante: Option<EmbeddedEnrollmentBody>,
}

/// Body of `POST /ramos-cursados`
#[derive(Debug, Serialize)]
pub struct CreateCourseBody {
    /// Student id
    pub id_estudiante: i64,
    /// Owning enrollment id
    pub periodo_academico_estudiante_id: i64,
    /// Course code
    pub codigo_ramo: String,
    /// Course name
    pub nombre_ramo: String,
    /// Wire state
    pub estado: &'static str,
    /// Final grade
    pub promedio_final: Option<f64>,
    /// Attempt number
    pub oportunidad: u32,
    /// Credit weight
    pub creditos: u32,
}

/// Body of `PATCH /ramos-cursados/{id}`; absent fields are left untouched
#[derive(Debug, Default, Serialize)]
pub struct PatchCourseBody {
    /// Wire state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<&'static str>,
    /// Final grade; `Some(None)` serializes as `null` and clears it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promedio_final: Option<Option<f64>>,
    /// Attempt number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oportunidad: Option<u32>,
    /// New owning enrollment id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo_academico_estudiante_id: Option<i64>,
}

fn default_attempt() -> u32 {
    1
}

/// Wire name of a course state
pub fn state_to_wire(state: CourseState) -> &'static str {
    match state {
        CourseState::Pending => "pendiente",
        CourseState::InProgress => "cursando",
        CourseState::Approved => "aprobado",
        CourseState::Failed => "reprobado",
    }
}

/// Parse a wire state; English names are accepted too
pub fn state_from_wire(state: &str) -> Result<CourseState, SdkError> {
    match state.trim().to_lowercase().as_str() {
        "pendiente" => Ok(CourseState::Pending),
        "cursando" | "en curso" | "en_curso" => Ok(CourseState::InProgress),
        "aprobado" => Ok(CourseState::Approved),
        "reprobado" => Ok(CourseState::Failed),
        other => CourseState::parse(other)
            .ok_or_else(|| SdkError::InvalidData(format!("Unknown course state '{}'", state))),
    }
}

impl From<PeriodBody> for AcademicPeriod {
    fn from(body: PeriodBody) -> Self {
        AcademicPeriod {
            id: PeriodId::from_value(body.id),
            key: PeriodKey::new(body.year, body.term),
            current: body.current,
        }
    }
}

impl From<EnrollmentBody> for StudentPeriodEnrollment {
    fn from(body: EnrollmentBody) -> Self {
        StudentPeriodEnrollment {
            id: EnrollmentId::from_value(body.id),
            student: StudentId::from_value(body.estudiante_id),
            period: PeriodId::from_value(body.periodo_academico_id),
            period_key: body
                .periodo_academico
                .map(|p| PeriodKey::new(p.year, p.term)),
            start_date: body.fecha_inicio,
            end_date: body.fecha_fin,
            currently_enrolled: body.activo,
            notes: body.observaciones,
        }
    }
}

impl TryFrom<CourseBody> for CourseRecord {
    type Error = SdkError;

    fn try_from(body: CourseBody) -> Result<Self, Self::Error> {
        let state = state_from_wire(&body.estado)?;
        let period = body
            .periodo_academico_estudiante
            .and_then(|e| e.periodo_academico)
            .map(|p| PeriodKey::new(p.year, p.term));

        Ok(CourseRecord {
            id: CourseId::from_value(body.id),
            code: body.codigo_ramo,
            name: body.nombre_ramo,
            enrollment: EnrollmentId::from_value(body.periodo_academico_estudiante_id),
            period,
            state,
            final_grade: body.promedio_final,
            attempt: body.oportunidad.max(1),
            credits: body.creditos,
        })
    }
}

impl From<NewCourse> for CreateCourseBody {
    fn from(course: NewCourse) -> Self {
        CreateCourseBody {
            id_estudiante: course.student.value(),
            periodo_academico_estudiante_id: course.enrollment.value(),
            codigo_ramo: course.code,
            nombre_ramo: course.name,
            estado: state_to_wire(course.state),
            promedio_final: course.final_grade,
            oportunidad: course.attempt,
            creditos: course.credits,
        }
    }
}

impl From<CoursePatch> for PatchCourseBody {
    fn from(patch: CoursePatch) -> Self {
        PatchCourseBody {
            estado: patch.state.map(state_to_wire),
            promedio_final: patch.final_grade,
            oportunidad: patch.attempt,
            periodo_academico_estudiante_id: patch.enrollment.map(|e| e.value()),
        }
    }
}
