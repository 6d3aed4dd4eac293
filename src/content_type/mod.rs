//! Content types: named schemas describing the fields and actions that apply
//! to items from one or more providers.

pub mod actions;
pub mod builtin;
pub mod descriptor;
pub mod registry;

pub use actions::{ActionFactories, ContentAction};
pub use builtin::{DeclaredContentType, TextContentType};
pub use descriptor::{ContentTypeDescriptor, ContentTypeSchema, Field};
pub use registry::ContentTypeRegistry;
