//! Extraction Wizard Library
//!
//! Client side of an AI-backed PDF field extraction service:
//! - `api`: wire types, the [`ExtractionApi`] seam and the HTTP [`ApiClient`]
//! - `schema`: schema drafts and validation
//! - `results`: field normalization, rendering and the edit buffer
//! - `wizard`: the upload → schema → process → results state machine
//! - `export`: spreadsheet output
//! - `cli`: the command-line front end

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod results;
pub mod schema;
pub mod upload;
pub mod wizard;

pub use api::{ApiClient, ExtractionApi, ExtractionResult, Schema};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use export::{ExportSource, ExportedFile};
pub use results::{EditBuffer, ProcessingStats, ResultTable};
pub use schema::SchemaDraft;
pub use upload::PdfUpload;
pub use wizard::{Notice, NoticeLevel, Step, Wizard, WizardConfig};
