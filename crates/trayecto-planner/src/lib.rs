//! Trayecto Planner
//!
//! Keeps a student's curriculum view in step with the student-records store.
//!
//! # Overview
//!
//! The planner is responsible for:
//! - **Loading**: grouping course records into semester buckets ([`CurriculumLoader`])
//! - **Period resolution**: find-or-create of academic periods ([`PeriodRegistry`])
//! - **Enrollment resolution**: find-or-create of student enrollments ([`EnrollmentLinker`])
//! - **Reassignment**: optimistic course moves and edits reconciled with the
//!   store ([`ReassignmentCoordinator`])
//!
//! # Move lifecycle
//!
//! | State | Entered when | Leaves to |
//! |-------|--------------|-----------|
//! | **Idle** | No move running | Moving (course changes semester) |
//! | **Moving** | Optimistic move applied | Confirmed or RolledBack |
//! | **Confirmed** | Store accepted the new enrollment | Moving (next move) |
//! | **RolledBack** | A step failed; view reconciled | Moving (next move) |
//!
//! A move within one semester, or onto the course's own position, never
//! leaves Idle and never reaches the store.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use trayecto_domain::{CourseId, PeriodKey, StudentId};
//! use trayecto_planner::{PlannerConfig, ReassignmentCoordinator};
//! use trayecto_sdk::TrayectoClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TrayectoClient::new("http://localhost:3000")?.with_token("session-token");
//!     let planner = ReassignmentCoordinator::open(
//!         Arc::new(client),
//!         StudentId::from_value(42),
//!         &PlannerConfig::default(),
//!     )
//!     .await?;
//!
//!     planner
//!         .move_course(CourseId::from_value(7), PeriodKey::new(2025, 2), None)
//!         .await?;
//!     println!("{:.1}% advanced", planner.progress().percent_advanced);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The planner can be configured via TOML:
//!
//! ```toml
//! [planner]
//! step_timeout_secs = 15
//! max_retries = 0
//! retry_backoff_ms = 250
//! anchor_year = 2025
//! ```

#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod linker;
mod loader;
mod registry;
mod retry;
mod single_flight;

pub use config::PlannerConfig;
pub use coordinator::{CourseDraft, MoveReport, MoveState, ReassignmentCoordinator};
pub use error::PlannerError;
pub use linker::EnrollmentLinker;
pub use loader::CurriculumLoader;
pub use registry::PeriodRegistry;
