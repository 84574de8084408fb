//! Grading scale engine: tiers, templates, validation, resolution and the
//! single-default policy. Stateless; callers own the definition set.

pub mod defaults;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod resolve;
pub mod revision;
pub mod templates;
pub mod validate;

pub use error::{ScaleError, Warning};
pub use model::{DefinitionInput, GradeDefinition, GradeRange};
