//! Wire types exchanged with the extraction backend

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Upload
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ready,
}

/// A file accepted by the backend for the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Client-generated identifier (the server does not assign one)
    #[serde(default = "new_file_id")]
    pub id: String,
    pub original_name: String,
    /// Name under which the server stored the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_name: Option<String>,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(default = "default_file_status")]
    pub status: FileStatus,
}

fn new_file_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_file_status() -> FileStatus {
    FileStatus::Ready
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub file: UploadedFile,
    pub session_id: String,
}

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Email,
    Phone,
    Currency,
    Percentage,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Currency,
        FieldType::Percentage,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Currency => "Currency",
            FieldType::Percentage => "Percentage",
        }
    }
}

/// One named, typed field of an extraction schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A stored extraction schema. Immutable once fetched; edits go through
/// [`crate::schema::SchemaDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Request body for schema create/update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaPayload {
    pub name: String,
    pub description: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaListResponse {
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaResponse {
    pub schema: Schema,
}

// ============================================================================
// Processing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Per-document outcome of a processing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn success(filename: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            filename: filename.into(),
            status: ResultStatus::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            status: ResultStatus::Error,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Extracted fields; `None` for failed documents even if the server sent data.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        if self.is_success() {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn fields_mut(&mut self) -> Option<&mut Map<String, Value>> {
        if self.is_success() {
            self.data.as_mut()
        } else {
            None
        }
    }

    /// Error text for failed documents ("Unknown error" when the server sent none).
    pub fn error_message(&self) -> Option<&str> {
        match self.status {
            ResultStatus::Success => None,
            ResultStatus::Error => Some(self.error.as_deref().unwrap_or("Unknown error")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    #[serde(default)]
    pub results: Vec<ExtractionResult>,
    pub result_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProcessRequest<'a> {
    pub session_id: &'a str,
    pub schema_id: &'a str,
}

/// Render a server timestamp for display, falling back to the raw text.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upload_response_deserialization() {
        let json = r#"{
            "session_id": "s-1",
            "file": {"original_name": "quote.pdf", "stored_name": "s-1_quote.pdf", "size": 2048},
            "message": "File uploaded successfully"
        }"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.session_id, "s-1");
        assert_eq!(response.file.original_name, "quote.pdf");
        assert_eq!(response.file.size_bytes, 2048);
        assert_eq!(response.file.status, FileStatus::Ready);
        assert_eq!(response.file.id.len(), 36);
    }

    #[test]
    fn test_schema_deserialization() {
        let json = r#"{
            "id": "abc",
            "name": "Quotes",
            "description": "",
            "fields": [
                {"name": "company_name", "type": "text", "description": "Company", "required": true},
                {"name": "total_amount", "type": "currency"}
            ],
            "created_at": "2024-05-01T10:20:30.123456"
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.fields.len(), 2);
        assert_eq!(schema.fields[0].field_type, FieldType::Text);
        assert!(schema.fields[0].required);
        assert_eq!(schema.fields[1].field_type, FieldType::Currency);
        assert!(!schema.fields[1].required);
    }

    #[test]
    fn test_field_type_serializes_as_type() {
        let field = Field {
            name: "email".to_string(),
            field_type: FieldType::Email,
            description: None,
            required: false,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "email", "type": "email", "required": false})
        );
    }

    #[test]
    fn test_failed_result_hides_data() {
        let json = r#"{"filename": "a.pdf", "status": "error", "data": {"a": 1}, "error": null}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert!(result.fields().is_none());
        assert_eq!(result.error_message(), Some("Unknown error"));
    }

    #[test]
    fn test_data_key_order_preserved() {
        let json = r#"{"filename": "a.pdf", "status": "success", "data": {"zeta": 1, "alpha": 2}}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = result.fields().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2024-05-01T10:20:30.123456"), "2024-05-01 10:20");
        assert_eq!(format_timestamp("2024-05-01T10:20:30+00:00"), "2024-05-01 10:20");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
