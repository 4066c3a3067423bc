//! Four-step extraction wizard
//!
//! The [`Wizard`] owns the session and walks it through
//! upload → schema → process → results. Forward transitions are gated on
//! their prerequisites; going back never discards collected data.
//!
//! Every action that fails records an error [`Notice`] and returns the
//! error; a failed action never leaves the wizard on a step it had not
//! reached.

pub mod progress;
pub mod state;

pub use progress::{ProgressGuard, ProgressState, ProgressTicker, PROCESSING_PHASES};
pub use state::{BusyGuard, Notice, NoticeLevel, ProcessingFlag, Session, Step};

use crate::api::client::EXPORT_FAILED;
use crate::api::{ExtractionApi, Schema, UploadedFile};
use crate::error::{Error, Result};
use crate::export::{self, ExportedFile};
use crate::results::{CellRef, EditBuffer, ProcessingStats, ResultTable};
use crate::schema::SchemaDraft;
use crate::upload::{validate_selection, PdfUpload};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Wizard configuration
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Time between cosmetic progress phases
    pub progress_period: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            progress_period: progress::DEFAULT_PHASE_PERIOD,
        }
    }
}

/// Session state machine over an [`ExtractionApi`] backend
pub struct Wizard<A: ExtractionApi + 'static> {
    api: Arc<A>,
    step: Step,
    session: Session,
    buffer: EditBuffer,
    processing: ProcessingFlag,
    progress: ProgressTicker,
    notices: Vec<Notice>,
}

impl<A: ExtractionApi + 'static> Wizard<A> {
    pub fn new(api: A) -> Self {
        Self::with_config(Arc::new(api), WizardConfig::default())
    }

    pub fn with_config(api: Arc<A>, config: WizardConfig) -> Self {
        Self {
            api,
            step: Step::Upload,
            session: Session::default(),
            buffer: EditBuffer::default(),
            processing: ProcessingFlag::default(),
            progress: ProgressTicker::new(config.progress_period),
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Handle for observing the busy flag from elsewhere.
    pub fn processing_flag(&self) -> ProcessingFlag {
        self.processing.clone()
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressState> {
        self.progress.subscribe()
    }

    pub fn progress_state(&self) -> ProgressState {
        self.progress.state()
    }

    /// Drain the notifications raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Validate and upload a PDF, opening a new session.
    pub async fn upload_file(&mut self, file: &PdfUpload) -> Result<UploadedFile> {
        if let Err(err) = validate_selection(std::slice::from_ref(file)) {
            return Err(self.fail(err));
        }
        let Some(_busy) = self.processing.try_begin() else {
            return Err(self.fail(Error::Busy));
        };

        let response = match self.api.upload_file(file).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(err)),
        };

        info!(
            session_id = %response.session_id,
            file = %response.file.original_name,
            "File uploaded"
        );
        self.session.session_id = Some(response.session_id);
        self.session.uploaded_file = Some(response.file.clone());
        // Results belong to the previous session
        self.session.results = None;
        self.session.result_id = None;
        self.buffer.clear();
        self.step = Step::Schema;
        self.notify(Notice::success("File uploaded successfully!"));
        Ok(response.file)
    }

    /// Select (or re-select) the extraction schema.
    pub fn select_schema(&mut self, schema: Schema) -> Result<()> {
        if self.step < Step::Schema {
            let err = self.transition_error("select a schema");
            return Err(self.fail(err));
        }

        info!(schema_id = %schema.id, schema = %schema.name, "Schema selected");
        self.notify(Notice::success(format!("Schema \"{}\" selected", schema.name)));
        self.session.selected_schema = Some(schema);
        self.step = Step::Process;
        Ok(())
    }

    /// Run extraction for the uploaded file with the selected schema.
    pub async fn process(&mut self) -> Result<ProcessingStats> {
        self.run_processing(
            Step::Process,
            "Please upload files and select a schema first",
            "Documents processed successfully!",
        )
        .await
    }

    /// Regenerate results for the same session and schema.
    ///
    /// On failure the wizard stays on the results step with the previous
    /// results intact.
    pub async fn reprocess(&mut self) -> Result<ProcessingStats> {
        if self.step != Step::Results {
            let err = self.transition_error("re-process");
            return Err(self.fail(err));
        }
        self.run_processing(
            Step::Results,
            "Cannot re-process: missing session or schema",
            "Documents re-processed successfully!",
        )
        .await
    }

    async fn run_processing(
        &mut self,
        failure_step: Step,
        missing_prerequisite: &str,
        success_message: &str,
    ) -> Result<ProcessingStats> {
        let (Some(session_id), Some(schema_id)) = (
            self.session.session_id.clone(),
            self.session.selected_schema.as_ref().map(|s| s.id.clone()),
        ) else {
            return Err(self.fail(Error::validation([missing_prerequisite])));
        };
        let Some(_busy) = self.processing.try_begin() else {
            return Err(self.fail(Error::Busy));
        };

        self.step = Step::Process;
        info!(session_id = %session_id, schema_id = %schema_id, "Processing documents");

        let outcome = {
            let _progress = self.progress.start();
            self.api.process_documents(&session_id, &schema_id).await
        };

        match outcome {
            Ok(response) => {
                self.buffer.load(&response.results);
                let stats = self.buffer.compute_stats();
                self.session.results = Some(response.results);
                self.session.result_id = Some(response.result_id);
                self.step = Step::Results;
                info!(
                    total = stats.total,
                    success = stats.success,
                    failed = stats.failed,
                    "Processing finished"
                );
                self.notify(Notice::success(success_message));
                Ok(stats)
            }
            Err(err) => {
                self.step = failure_step;
                Err(self.fail(err))
            }
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.step.previous().is_some() && !self.processing.is_set()
    }

    /// Step back once. Collected data is kept.
    pub fn go_back(&mut self) -> Result<Step> {
        let previous = match self.step.previous() {
            Some(previous) if !self.processing.is_set() => previous,
            _ => {
                let err = self.transition_error("go back");
                return Err(self.fail(err));
            }
        };

        debug!(from = %self.step.label(), to = %previous.label(), "Going back");
        self.step = previous;
        self.notify(Notice::success("Navigated to previous step"));
        Ok(previous)
    }

    /// Clear all local state and return to the upload step.
    ///
    /// Server-side teardown runs in the background and its failure is only
    /// logged. The returned handle may be awaited but never needs to be.
    pub fn reset(&mut self) -> Option<JoinHandle<()>> {
        let teardown = self
            .session
            .session_id
            .take()
            .and_then(|session_id| self.spawn_teardown(session_id));

        self.session = Session::default();
        self.buffer.clear();
        self.step = Step::Upload;
        info!("Session reset");
        self.notify(Notice::success("Session reset successfully"));
        teardown
    }

    fn spawn_teardown(&self, session_id: String) -> Option<JoinHandle<()>> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(session_id = %session_id, "No async runtime, skipping server-side session reset");
                return None;
            }
        };

        let api = Arc::clone(&self.api);
        Some(handle.spawn(async move {
            match api.reset_session(&session_id).await {
                Ok(()) => debug!(session_id = %session_id, "Server session cleared"),
                Err(err) => warn!(session_id = %session_id, error = %err, "Failed to reset session"),
            }
        }))
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Save the current results as a spreadsheet in `dir`.
    ///
    /// An unedited result set is fetched from the backend; once any cell has
    /// been edited the workbook is written locally from the edit buffer.
    pub async fn export(&mut self, dir: &Path) -> Result<ExportedFile> {
        let Some(result_id) = self.session.result_id.clone() else {
            return Err(self.fail(Error::validation(["No results to export"])));
        };
        let Some(_busy) = self.processing.try_begin() else {
            return Err(self.fail(Error::Busy));
        };

        let outcome = if self.buffer.is_modified() {
            export::write_workbook(dir, &result_id, self.buffer.editable_results())
        } else {
            match self.api.export_results(&result_id).await {
                Ok(bytes) => export::save_blob(dir, &result_id, &bytes),
                Err(err) => Err(err),
            }
        };

        match outcome.map_err(into_export_error) {
            Ok(exported) => {
                self.notify(Notice::success("Results exported successfully!"));
                Ok(exported)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    pub async fn list_schemas(&mut self) -> Result<Vec<Schema>> {
        match self.api.list_schemas().await {
            Ok(schemas) => {
                debug!(count = schemas.len(), "Loaded schemas");
                Ok(schemas)
            }
            Err(err) => {
                warn!(error = %err, "Failed to load schemas");
                self.notify(Notice::error("Failed to load schemas"));
                Err(err)
            }
        }
    }

    /// Create a schema, or update `editing` when given.
    ///
    /// When the updated schema is the selected one the selection is
    /// refreshed with the server's copy.
    pub async fn save_schema(&mut self, draft: &SchemaDraft, editing: Option<&str>) -> Result<Schema> {
        let payload = match draft.to_payload() {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail(err)),
        };

        let outcome = match editing {
            Some(schema_id) => self.api.update_schema(schema_id, &payload).await,
            None => self.api.create_schema(&payload).await,
        };
        let schema = match outcome {
            Ok(schema) => schema,
            Err(err) => return Err(self.fail(err)),
        };

        let message = match editing {
            Some(schema_id) => {
                let selected = self
                    .session
                    .selected_schema
                    .as_mut()
                    .filter(|s| s.id == schema_id);
                if let Some(selected) = selected {
                    *selected = schema.clone();
                }
                "Schema updated successfully"
            }
            None => "Schema created successfully",
        };
        info!(schema_id = %schema.id, schema = %schema.name, "{}", message);
        self.notify(Notice::success(message));
        Ok(schema)
    }

    /// Delete a schema; a matching selection is cleared.
    ///
    /// The step is left alone: processing without a selection is refused
    /// until another schema is chosen.
    pub async fn delete_schema(&mut self, schema_id: &str) -> Result<()> {
        if let Err(err) = self.api.delete_schema(schema_id).await {
            return Err(self.fail(err));
        }

        let was_selected = self
            .session
            .selected_schema
            .as_ref()
            .is_some_and(|s| s.id == schema_id);
        if was_selected {
            self.session.selected_schema = None;
        }
        info!(schema_id = %schema_id, "Schema deleted");
        self.notify(Notice::success("Schema deleted successfully"));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Field-major view over the edit buffer.
    pub fn table(&self) -> ResultTable<'_> {
        ResultTable::new(self.buffer.editable_results())
    }

    pub fn stats(&self) -> ProcessingStats {
        self.buffer.compute_stats()
    }

    /// Open an editor on one cell, seeded with its current text.
    pub fn start_edit(&mut self, document_index: usize, field_name: &str) -> Result<()> {
        if self.step != Step::Results {
            let err = self.transition_error("edit results");
            return Err(self.fail(err));
        }
        let editable = self
            .buffer
            .editable_results()
            .get(document_index)
            .is_some_and(|r| r.fields().is_some());
        if !editable {
            let err = Error::validation([format!(
                "Document {} has no editable data",
                document_index + 1
            )]);
            return Err(self.fail(err));
        }

        let current = self.table().edit_value(document_index, field_name);
        self.buffer.start_edit(document_index, field_name, &current);
        Ok(())
    }

    pub fn set_edit_value(&mut self, value: impl Into<String>) {
        self.buffer.set_edit_value(value);
    }

    pub fn commit_edit(&mut self) -> Option<CellRef> {
        let cell = self.buffer.commit_edit()?;
        debug!(document = cell.document_index, field = %cell.field_name, "Edit committed");
        Some(cell)
    }

    pub fn cancel_edit(&mut self) {
        self.buffer.cancel_edit();
    }

    // ------------------------------------------------------------------

    fn transition_error(&self, action: &str) -> Error {
        Error::InvalidTransition {
            step: self.step.label().to_string(),
            action: action.to_string(),
        }
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn fail(&mut self, err: Error) -> Error {
        if err.is_local() {
            debug!(error = %err, "Action refused");
        } else {
            warn!(error = %err, "Action failed");
        }
        self.notify(Notice::error(err.client_message()));
        err
    }
}

fn into_export_error(err: Error) -> Error {
    match err {
        Error::Export { .. } => err,
        other => {
            warn!(error = %other, "Export failed");
            Error::export(EXPORT_FAILED)
        }
    }
}
