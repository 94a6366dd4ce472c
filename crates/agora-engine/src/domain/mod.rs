//! Domain layer: entities, key layout, validation, and errors.

pub mod entities;
pub mod errors;
pub mod keys;
pub mod validation;
