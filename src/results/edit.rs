//! Editable working copy of extraction results

use crate::api::ExtractionResult;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Address of one editable cell
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub document_index: usize,
    pub field_name: String,
}

impl CellRef {
    pub fn new(document_index: usize, field_name: impl Into<String>) -> Self {
        Self {
            document_index,
            field_name: field_name.into(),
        }
    }
}

/// Aggregate outcome of a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Rounded percentage, 0 when there are no results
    pub success_rate: u32,
}

impl ProcessingStats {
    pub fn compute(results: &[ExtractionResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }
        let total = results.len();
        let success = results.iter().filter(|r| r.is_success()).count();
        let success_rate = (success as f64 / total as f64 * 100.0).round() as u32;
        Self {
            total,
            success,
            failed: total - success,
            success_rate,
        }
    }
}

/// Mutable copy of a result set with a single, system-wide edit lock.
///
/// The buffer owns a deep copy; the results it was loaded from are never
/// touched. Only the buffer feeds export.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    results: Vec<ExtractionResult>,
    editing: Option<CellRef>,
    edit_value: String,
    edited: BTreeSet<CellRef>,
}

impl EditBuffer {
    pub fn new(results: &[ExtractionResult]) -> Self {
        let mut buffer = Self::default();
        buffer.load(results);
        buffer
    }

    /// Replace the working copy with a fresh copy of `results`.
    /// Pending and committed edits are dropped.
    pub fn load(&mut self, results: &[ExtractionResult]) {
        self.results = results.to_vec();
        self.editing = None;
        self.edit_value.clear();
        self.edited.clear();
    }

    pub fn clear(&mut self) {
        self.load(&[]);
    }

    pub fn editable_results(&self) -> &[ExtractionResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Take the edit lock for a cell, abandoning any unsaved edit.
    pub fn start_edit(
        &mut self,
        document_index: usize,
        field_name: impl Into<String>,
        current_value: &str,
    ) {
        let cell = CellRef::new(document_index, field_name);
        if let Some(previous) = self.editing.as_ref().filter(|c| **c != cell) {
            tracing::debug!(
                document = previous.document_index,
                field = %previous.field_name,
                "Abandoning unsaved edit"
            );
        }
        self.editing = Some(cell);
        self.edit_value = current_value.to_string();
    }

    pub fn set_edit_value(&mut self, value: impl Into<String>) {
        self.edit_value = value.into();
    }

    pub fn editing(&self) -> Option<&CellRef> {
        self.editing.as_ref()
    }

    pub fn edit_value(&self) -> &str {
        &self.edit_value
    }

    /// Write the pending value into the buffer and release the lock.
    ///
    /// Returns the cell written, or `None` when no edit was active or the
    /// target document has no data.
    pub fn commit_edit(&mut self) -> Option<CellRef> {
        let cell = self.editing.take()?;
        let value = std::mem::take(&mut self.edit_value);

        let data = self
            .results
            .get_mut(cell.document_index)
            .and_then(ExtractionResult::fields_mut)?;
        data.insert(cell.field_name.clone(), Value::String(value));
        self.edited.insert(cell.clone());
        Some(cell)
    }

    /// Release the lock without touching the data.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit_value.clear();
    }

    /// Cells changed by committed edits.
    pub fn edited_cells(&self) -> impl Iterator<Item = &CellRef> {
        self.edited.iter()
    }

    pub fn is_modified(&self) -> bool {
        !self.edited.is_empty()
    }

    pub fn compute_stats(&self) -> ProcessingStats {
        ProcessingStats::compute(&self.results)
    }
}
