//! Built-in content types.

use serde::{Deserialize, Serialize};

use super::descriptor::{ContentTypeDescriptor, ContentTypeSchema, Field};

/// Plain text content (the default supported type of every provider)
#[derive(Debug, Clone, Copy, Default)]
pub struct TextContentType;

impl ContentTypeSchema for TextContentType {
    fn define(&self, ty: &mut ContentTypeDescriptor) {
        ty.set_name("text");
        ty.set_title("Text");
        ty.add_field("text", "text", Some("Text"));
    }
}

/// Content type declared in data (e.g. the config file) rather than code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredContentType {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub fields: Vec<Field>,

    /// Action handler identifiers
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ContentTypeSchema for DeclaredContentType {
    fn define(&self, ty: &mut ContentTypeDescriptor) {
        ty.set_name(self.name.clone());
        if let Some(ref title) = self.title {
            ty.set_title(title.clone());
        }
        ty.set_category(self.category.clone());
        for field in &self.fields {
            ty.add_field(field.name.clone(), field.field_type.clone(), field.title.as_deref());
        }
        ty.set_action_handlers(self.actions.clone());
    }
}
