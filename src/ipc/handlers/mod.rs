pub mod core;
pub mod scales;
pub mod setup;
pub mod templates;
