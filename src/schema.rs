//! Schema drafts and validation
//!
//! Fetched [`Schema`]s are read-only. Creating or editing one happens on a
//! [`SchemaDraft`], which is validated and converted to a [`SchemaPayload`]
//! before it is sent to the backend.

use crate::api::{Field, FieldType, Schema, SchemaPayload};
use crate::error::{Error, Result};
use uuid::Uuid;

/// Editable field row. `id` is client-only and never sent to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    pub id: Uuid,
    pub name: String,
    pub field_type: Option<FieldType>,
    pub description: String,
    pub required: bool,
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            field_type: Some(field_type),
            description: String::new(),
            required: false,
        }
    }

    fn from_field(field: &Field) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: field.name.clone(),
            field_type: Some(field.field_type),
            description: field.description.clone().unwrap_or_default(),
            required: field.required,
        }
    }
}

/// Partial update applied by [`SchemaDraft::update_field`]
#[derive(Debug, Clone, Default)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
    pub description: Option<String>,
    pub required: Option<bool>,
}

/// Local working copy of a schema being created or edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDraft {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldDraft>,
}

/// Default fields offered for manufacturing quotations and enquiries
const DEFAULT_FIELDS: [(&str, FieldType, &str, bool); 7] = [
    ("company_name", FieldType::Text, "Company or supplier name", true),
    ("contact_person", FieldType::Text, "Contact person name", false),
    ("email", FieldType::Email, "Email address", false),
    ("phone", FieldType::Phone, "Phone number", false),
    ("quotation_number", FieldType::Text, "Quotation or reference number", false),
    ("date", FieldType::Date, "Document date", false),
    ("total_amount", FieldType::Currency, "Total amount or price", false),
];

impl SchemaDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Start editing a copy of a fetched schema.
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            description: schema.description.clone().unwrap_or_default(),
            fields: schema.fields.iter().map(FieldDraft::from_field).collect(),
        }
    }

    /// Append a blank text field and return its id.
    pub fn add_field(&mut self) -> Uuid {
        let field = FieldDraft::new("", FieldType::Text);
        let id = field.id;
        self.fields.push(field);
        id
    }

    pub fn remove_field(&mut self, id: Uuid) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        self.fields.len() != before
    }

    pub fn update_field(&mut self, id: Uuid, update: FieldUpdate) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        if let Some(name) = update.name {
            field.name = name;
        }
        if let Some(field_type) = update.field_type {
            field.field_type = Some(field_type);
        }
        if let Some(description) = update.description {
            field.description = description;
        }
        if let Some(required) = update.required {
            field.required = required;
        }
        true
    }

    /// Replace all fields with the default field set.
    pub fn use_default_fields(&mut self) {
        self.fields = DEFAULT_FIELDS
            .iter()
            .map(|(name, field_type, description, required)| FieldDraft {
                id: Uuid::new_v4(),
                name: name.to_string(),
                field_type: Some(*field_type),
                description: description.to_string(),
                required: *required,
            })
            .collect();
    }

    /// Validate and convert to the request body, dropping client-only ids.
    pub fn to_payload(&self) -> Result<SchemaPayload> {
        let errors = validate_schema(self);
        if !errors.is_empty() {
            return Err(Error::Validation { errors });
        }

        let fields = self
            .fields
            .iter()
            .filter_map(|f| {
                f.field_type.map(|field_type| Field {
                    name: f.name.trim().to_string(),
                    field_type,
                    description: Some(f.description.clone()).filter(|d| !d.is_empty()),
                    required: f.required,
                })
            })
            .collect();

        Ok(SchemaPayload {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            fields,
        })
    }
}

/// Check a draft for completeness. Empty = valid.
///
/// All rules are collected in order: schema name, field count, then per
/// field (1-based) its name and type.
pub fn validate_schema(draft: &SchemaDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push("Schema name is required".to_string());
    }

    if draft.fields.is_empty() {
        errors.push("At least one field is required".to_string());
    }

    for (index, field) in draft.fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            errors.push(format!("Field {}: Name is required", index + 1));
        }
        if field.field_type.is_none() {
            errors.push(format!("Field {}: Type is required", index + 1));
        }
    }

    errors
}
