//! Extraction backend API: wire types, the transport seam and the HTTP client

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    format_timestamp, ExtractionResult, Field, FieldType, FileStatus, ProcessResponse,
    ResultStatus, Schema, SchemaPayload, UploadResponse, UploadedFile,
};

use crate::error::Result;
use crate::upload::PdfUpload;
use async_trait::async_trait;

/// Operations offered by the extraction backend.
///
/// Every method fails with [`crate::Error::Request`] on transport or
/// server-reported failure, except `export_results` which fails with
/// [`crate::Error::Export`].
#[async_trait]
pub trait ExtractionApi: Send + Sync {
    /// Probe backend availability; returns the opaque status body.
    async fn health(&self) -> Result<serde_json::Value>;

    /// Upload a single, pre-validated PDF and open a session for it.
    async fn upload_file(&self, file: &PdfUpload) -> Result<UploadResponse>;

    async fn list_schemas(&self) -> Result<Vec<Schema>>;

    async fn create_schema(&self, payload: &SchemaPayload) -> Result<Schema>;

    async fn update_schema(&self, schema_id: &str, payload: &SchemaPayload) -> Result<Schema>;

    async fn delete_schema(&self, schema_id: &str) -> Result<()>;

    /// Run extraction for the session's file. Single blocking round-trip.
    async fn process_documents(&self, session_id: &str, schema_id: &str)
        -> Result<ProcessResponse>;

    /// Fetch the spreadsheet blob for a result set.
    async fn export_results(&self, result_id: &str) -> Result<Vec<u8>>;

    async fn reset_session(&self, session_id: &str) -> Result<()>;
}
