//! Content type descriptors.
//!
//! A content type is declared by implementing [`ContentTypeSchema`]. Building
//! a [`ContentTypeDescriptor`] runs the schema's `define` hook exactly once;
//! the result is shared behind an `Arc` and never changes afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::actions::{ActionFactories, ContentAction};
use crate::error::{ContentError, Result};

/// A single field of a content type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,

    /// Field value type (e.g. "text", "number", "url")
    #[serde(rename = "type")]
    pub field_type: String,

    /// Optional display title
    #[serde(default)]
    pub title: Option<String>,
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, title: Option<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            title,
        }
    }
}

/// Declarative definition of a content type
pub trait ContentTypeSchema {
    /// Describe the content type: must call `set_name`, may set title,
    /// category, fields and action handlers.
    fn define(&self, ty: &mut ContentTypeDescriptor);
}

/// Shape of a named content type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypeDescriptor {
    name: String,
    title: Option<String>,
    category: Option<String>,
    fields: Vec<Field>,
    action_handlers: Vec<String>,
    schema: String,
}

impl ContentTypeDescriptor {
    /// Build a descriptor by running the schema's `define` hook
    pub fn build<S: ContentTypeSchema>(schema: &S) -> Result<Self> {
        let mut descriptor = Self {
            name: String::new(),
            title: None,
            category: None,
            fields: Vec::new(),
            action_handlers: Vec::new(),
            schema: std::any::type_name::<S>().to_string(),
        };

        schema.define(&mut descriptor);

        if descriptor.name.is_empty() {
            return Err(ContentError::MissingContentTypeName(descriptor.schema));
        }

        Ok(descriptor)
    }

    /// Set the content type name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the display title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Set the category
    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    /// Add a field. A field with the same name is replaced in place.
    pub fn add_field(
        &mut self,
        name: impl Into<String>,
        field_type: impl Into<String>,
        title: Option<&str>,
    ) {
        let field = Field::new(name, field_type, title.map(str::to_string));
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Add an action handler identifier
    pub fn add_action_handler(&mut self, handler: impl Into<String>) {
        self.action_handlers.push(handler.into());
    }

    /// Replace all action handler identifiers
    pub fn set_action_handlers(&mut self, handlers: Vec<String>) {
        self.action_handlers = handlers;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn action_handlers(&self) -> &[String] {
        &self.action_handlers
    }

    /// Rust type name of the schema that defined this content type
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Title used for items of this type (title, else name)
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Instantiate one action per handler, keyed by action name.
    ///
    /// Fails on the first handler without a factory.
    pub fn actions(
        &self,
        factories: &ActionFactories,
    ) -> Result<HashMap<String, Box<dyn ContentAction>>> {
        let mut result = HashMap::new();
        for handler in &self.action_handlers {
            let action = factories
                .create(handler)
                .ok_or_else(|| ContentError::UnknownActionHandler(handler.clone()))?;
            result.insert(action.name().to_string(), action);
        }
        Ok(result)
    }
}
