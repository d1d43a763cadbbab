//! Opening a planner session for the active profile.

use crate::config::Config;
use crate::error::{CliError, Result};
use std::sync::Arc;
use trayecto_domain::StudentId;
use trayecto_planner::ReassignmentCoordinator;
use trayecto_sdk::TrayectoClient;

/// Planner bound to the HTTP client
pub type Planner = ReassignmentCoordinator<TrayectoClient>;

/// Command-line overrides for the active profile
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Student to edit instead of the profile's
    pub student: Option<i64>,
    /// Token to send instead of the profile's
    pub token: Option<String>,
}

/// Connect to the profile's API and load the student's curriculum.
pub async fn open_planner(config: &Config, options: &SessionOptions) -> Result<Planner> {
    let profile = config.get_active_profile()?;
    let student = options
        .student
        .or(profile.student_id)
        .map(StudentId::from_value)
        .ok_or(CliError::NoStudent)?;

    let mut client = TrayectoClient::with_timeout(&profile.api_url, config.planner.step_timeout())?;
    if let Some(token) = options.token.as_ref().or(profile.token.as_ref()) {
        client = client.with_token(token.clone());
    }

    tracing::debug!(url = %profile.api_url, %student, "Opening planner session");
    let planner = ReassignmentCoordinator::open(Arc::new(client), student, &config.planner).await?;

    for warning in planner.warnings() {
        tracing::warn!(%warning, "Curriculum store has duplicates");
    }
    Ok(planner)
}
