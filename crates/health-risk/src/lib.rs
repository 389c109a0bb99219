//! Employee health risk assessment: questionnaire scoring, report storage, and HTTP routes.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
