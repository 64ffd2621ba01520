//! Resource model
//!
//! Structure:
//! - `content.rs` - Dynamic content tree with typed accessors
//! - `resource.rs` - Resource identity, keys and arena ids
//! - `reference.rs` - Typed reference records
//! - `resource_type.rs` - Resource type classification

pub mod content;
pub mod reference;
pub mod resource;
pub mod resource_type;

pub use content::{Content, ContentError, ContentResult};
pub use reference::{Reference, ReferenceKind};
pub use resource::{
    is_kustomization_file, resource_key, Resource, ResourceId, KUSTOMIZATION_FILE_NAMES,
};
pub use resource_type::ResourceType;
