//! Template generation: remote client, local fallback and failure policy.

pub mod client;
pub mod error;
pub mod fallback;
pub mod service;

pub use client::{GenerationFuture, GenerationRequest, HttpTemplateClient, TemplateGenerator};
pub use error::TemplateServiceError;
pub use fallback::{fallback_template, fallback_title};
pub use service::{GenerationOutcome, TemplateService};
