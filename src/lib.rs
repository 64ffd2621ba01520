//! GitOps repository validator library
//!
//! Loads a Flux/Kustomize repository into a resource graph, resolves the
//! references between resources, finds what is unreachable from the entry
//! points and runs rule checks over the result. The binary is a thin layer
//! over this crate; everything it does can be driven from here.

pub mod analysis;
pub mod chart;
pub mod cli;
pub mod config;
pub mod context;
pub mod graph;
pub mod loader;
pub mod models;
pub mod results;
pub mod validator;
pub mod validators;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigLoader};
pub use context::ValidationContext;
pub use graph::ResourceGraph;
pub use models::{Reference, ReferenceKind, Resource, ResourceId, ResourceType};
pub use results::{Finding, Severity};
pub use validator::{ValidationReport, Validator, ValidatorOptions};
