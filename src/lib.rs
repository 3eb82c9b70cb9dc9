//! Placement matching service: multi-factor candidate scoring, aggregate score
//! maintenance, and the trainer/coordinator eligibility workflow that gates
//! which students may be matched against job postings.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
