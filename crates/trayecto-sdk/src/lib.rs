//! Trayecto Rust SDK
//!
//! HTTP client for the student-records services that own academic periods,
//! student enrollments and course records. [`TrayectoClient`] implements
//! [`trayecto_domain::CurriculumBackend`], so it plugs straight into the
//! planner.
//!
//! # Example
//!
//! ```no_run
//! use trayecto_domain::{CurriculumBackend, StudentId};
//! use trayecto_sdk::TrayectoClient;
//!
//! # async fn run() -> Result<(), trayecto_sdk::SdkError> {
//! let client = TrayectoClient::new("http://localhost:3000")?.with_token("session-token");
//! let courses = client.list_courses(StudentId::from_value(42), None).await?;
//! println!("{} courses", courses.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
pub mod wire;

pub use client::{TrayectoClient, DEFAULT_TIMEOUT_SECS};
pub use error::SdkError;
