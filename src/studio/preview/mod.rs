//! Live template preview.

pub mod placeholder;
pub mod variables;

pub use placeholder::PlaceholderRenderer;
pub use variables::{Preview, VariableEntry, VariableValues};
