//! Advisory risk screening for internship offers and solicitations.
//!
//! Heterogeneous detector outputs (company legitimacy, payment language,
//! behavioral language, a learned classifier) are combined into a bounded
//! score, a risk category and sanitized advisory explanations. The pipeline
//! never asserts that an opportunity is fraudulent.

pub mod agents;
pub mod config;
pub mod core;
pub mod intake;
pub mod pipeline;
