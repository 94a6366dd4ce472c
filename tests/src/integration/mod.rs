//! Cross-component integration scenarios.

pub mod flows;
pub mod lifecycle;
pub mod queries;
pub mod reactions;
