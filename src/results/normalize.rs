//! Canonical field ordering and the field-major result table

use super::value::{render, Rendered, EDIT_PLACEHOLDER};
use crate::api::ExtractionResult;
use serde_json::Value;
use std::collections::HashSet;

pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [3, 5, 10];
pub const DEFAULT_ROWS_PER_PAGE: usize = 5;
const TITLE_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any non-array value
    Scalar,
    /// Non-empty array of sub-records
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalField {
    pub name: String,
    pub kind: FieldKind,
}

impl CanonicalField {
    pub fn label(&self) -> String {
        humanize_field(&self.name)
    }
}

/// Ordered field list across all successful documents.
///
/// Scalar keys come first in first-seen order, followed by keys holding a
/// non-empty array in first-seen order. A key seen as a scalar in any
/// document stays in the scalar section.
pub fn canonical_fields(results: &[ExtractionResult]) -> Vec<CanonicalField> {
    let mut scalars: Vec<&str> = Vec::new();
    let mut groups: Vec<&str> = Vec::new();
    let mut seen_scalars = HashSet::new();
    let mut seen_groups = HashSet::new();

    for data in results.iter().filter_map(ExtractionResult::fields) {
        for (key, value) in data {
            if !value.is_array() && seen_scalars.insert(key.as_str()) {
                scalars.push(key.as_str());
            }
        }
        for (key, value) in data {
            let non_empty_array = value.as_array().is_some_and(|items| !items.is_empty());
            if non_empty_array && seen_groups.insert(key.as_str()) {
                groups.push(key.as_str());
            }
        }
    }

    groups.retain(|key| !seen_scalars.contains(key));

    scalars
        .into_iter()
        .map(|name| CanonicalField {
            name: name.to_string(),
            kind: FieldKind::Scalar,
        })
        .chain(groups.into_iter().map(|name| CanonicalField {
            name: name.to_string(),
            kind: FieldKind::Group,
        }))
        .collect()
}

/// `total_amount` -> `Total Amount`
pub fn humanize_field(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_word = false;
    for ch in name.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphanumeric() && !prev_is_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_is_word = ch.is_alphanumeric();
    }
    out
}

/// Page selection over the document columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub rows_per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl Pagination {
    /// Change the page size; returns to the first page like the original view.
    pub fn with_rows_per_page(rows_per_page: usize) -> Self {
        Self {
            page: 0,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page.max(1))
    }

    fn range(&self, total: usize) -> std::ops::Range<usize> {
        let per_page = self.rows_per_page.max(1);
        let start = self.page.saturating_mul(per_page).min(total);
        let end = start.saturating_add(per_page).min(total);
        start..end
    }
}

/// One successful document shown as a table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentColumn {
    /// Index into the full result list (used for edits)
    pub index: usize,
    pub filename: String,
}

impl DocumentColumn {
    /// Filename truncated for column headers.
    pub fn title(&self) -> String {
        if self.filename.chars().count() > TITLE_MAX_CHARS {
            let head: String = self.filename.chars().take(TITLE_MAX_CHARS).collect();
            format!("{}...", head)
        } else {
            self.filename.clone()
        }
    }
}

/// Content of one table cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// True when the document has no value for the field
    pub is_placeholder: bool,
}

/// Field-major view over a result set: rows are canonical fields,
/// columns are successful documents.
#[derive(Debug)]
pub struct ResultTable<'a> {
    results: &'a [ExtractionResult],
    fields: Vec<CanonicalField>,
    columns: Vec<DocumentColumn>,
}

impl<'a> ResultTable<'a> {
    pub fn new(results: &'a [ExtractionResult]) -> Self {
        let columns = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_success())
            .map(|(index, r)| DocumentColumn {
                index,
                filename: r.filename.clone(),
            })
            .collect();
        Self {
            results,
            fields: canonical_fields(results),
            columns,
        }
    }

    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    pub fn columns(&self) -> &[DocumentColumn] {
        &self.columns
    }

    /// Columns on the requested page.
    pub fn page(&self, pagination: Pagination) -> &[DocumentColumn] {
        &self.columns[pagination.range(self.columns.len())]
    }

    fn value(&self, document_index: usize, field: &str) -> Option<&'a Value> {
        self.results
            .get(document_index)
            .and_then(ExtractionResult::fields)
            .and_then(|data| data.get(field))
            .filter(|v| !is_blank(v))
    }

    pub fn cell(&self, document_index: usize, field: &str) -> Cell {
        match self.value(document_index, field) {
            Some(value) => Cell {
                text: render(value).to_inline(),
                is_placeholder: false,
            },
            None => Cell {
                text: EDIT_PLACEHOLDER.to_string(),
                is_placeholder: true,
            },
        }
    }

    /// Text to seed an editor with; empty for absent values.
    pub fn edit_value(&self, document_index: usize, field: &str) -> String {
        match self.value(document_index, field) {
            Some(Value::String(s)) => s.clone(),
            Some(value) => render(value).to_inline(),
            None => String::new(),
        }
    }

    /// Card view of one document: every canonical field with its rendering.
    pub fn document_view(&self, document_index: usize) -> Vec<(String, Rendered)> {
        self.fields
            .iter()
            .map(|field| {
                let rendered = self
                    .value(document_index, &field.name)
                    .map(render)
                    .unwrap_or(Rendered::Empty);
                (field.label(), rendered)
            })
            .collect()
    }

    /// Failed documents as `"<filename>: <error>"`.
    pub fn failures(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| {
                r.error_message()
                    .map(|error| format!("{}: {}", r.filename, error))
            })
            .collect()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::value::EMPTY_MARKER;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn success(name: &str, data: Value) -> ExtractionResult {
        ExtractionResult::success(name, data.as_object().cloned().unwrap_or_default())
    }

    fn names(fields: &[CanonicalField]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_scalars_before_groups() {
        let results = vec![
            success("one.pdf", json!({"a": 1, "b": [{"x": 1}]})),
            success("two.pdf", json!({"c": 2})),
        ];
        let fields = canonical_fields(&results);
        assert_eq!(names(&fields), vec!["a", "c", "b"]);
        assert_eq!(fields[2].kind, FieldKind::Group);
    }

    #[test]
    fn test_failed_documents_ignored() {
        let mut failed = ExtractionResult::failure("bad.pdf", "timeout");
        failed.data = Some(json!({"ghost": 1}).as_object().cloned().unwrap());
        let results = vec![failed, success("ok.pdf", json!({"a": null}))];
        assert_eq!(names(&canonical_fields(&results)), vec!["a"]);
    }

    #[test]
    fn test_empty_arrays_are_not_groups() {
        let results = vec![success("one.pdf", json!({"items": [], "total": 3}))];
        assert_eq!(names(&canonical_fields(&results)), vec!["total"]);
    }

    #[test]
    fn test_key_seen_as_scalar_stays_scalar() {
        let results = vec![
            success("one.pdf", json!({"items": [{"x": 1}]})),
            success("two.pdf", json!({"items": "none"})),
        ];
        let fields = canonical_fields(&results);
        assert_eq!(
            fields,
            vec![CanonicalField {
                name: "items".to_string(),
                kind: FieldKind::Scalar
            }]
        );
    }

    #[test]
    fn test_humanize_field() {
        assert_eq!(humanize_field("total_amount"), "Total Amount");
        assert_eq!(humanize_field("email"), "Email");
        assert_eq!(humanize_field("po-number"), "Po-Number");
        assert_eq!(humanize_field("vat_2024"), "Vat 2024");
    }

    #[test]
    fn test_table_cells_and_placeholders() {
        let results = vec![
            success("one.pdf", json!({"a": 1, "flag": true})),
            ExtractionResult::failure("bad.pdf", "boom"),
            success("two.pdf", json!({"b": ""})),
        ];
        let table = ResultTable::new(&results);
        assert_eq!(table.columns().len(), 2);
        assert_eq!(table.columns()[1].index, 2);
        assert_eq!(table.cell(0, "flag").text, "Yes");
        assert!(table.cell(2, "a").is_placeholder);
        assert_eq!(table.cell(2, "b").text, EDIT_PLACEHOLDER);
        assert_eq!(table.failures(), vec!["bad.pdf: boom"]);
    }

    #[test]
    fn test_document_view_marks_absent_fields() {
        let results = vec![
            success("one.pdf", json!({"a": 1})),
            success("two.pdf", json!({"b": 2})),
        ];
        let table = ResultTable::new(&results);
        let view = table.document_view(1);
        assert_eq!(view[0], ("A".to_string(), Rendered::Empty));
        assert_eq!(view[1], ("B".to_string(), Rendered::Text("2".to_string())));
        assert_eq!(view[0].1.to_inline(), EMPTY_MARKER);
    }

    #[test]
    fn test_pagination() {
        let results: Vec<_> = (0..7)
            .map(|i| success(&format!("doc{}.pdf", i), json!({"a": i})))
            .collect();
        let table = ResultTable::new(&results);
        let pagination = Pagination {
            page: 1,
            rows_per_page: 5,
        };
        assert_eq!(pagination.page_count(7), 2);
        let page = table.page(pagination);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].index, 5);
        assert!(table.page(Pagination { page: 9, rows_per_page: 3 }).is_empty());
        assert_eq!(Pagination::with_rows_per_page(10).page, 0);
    }

    #[test]
    fn test_pagination_far_past_the_end() {
        let results = vec![success("a.pdf", json!({"a": 1}))];
        let table = ResultTable::new(&results);
        let pagination = Pagination {
            page: usize::MAX,
            rows_per_page: 5,
        };
        assert!(table.page(pagination).is_empty());
        let pagination = Pagination {
            page: 1,
            rows_per_page: usize::MAX,
        };
        assert!(table.page(pagination).is_empty());
    }

    #[test]
    fn test_column_title_truncation() {
        let column = DocumentColumn {
            index: 0,
            filename: "a_very_long_quotation_file.pdf".to_string(),
        };
        assert_eq!(column.title(), "a_very_long_quotatio...");
    }

    #[test]
    fn test_edit_value_seeds() {
        let results = vec![success("one.pdf", json!({"name": "ACME", "qty": 3}))];
        let table = ResultTable::new(&results);
        assert_eq!(table.edit_value(0, "name"), "ACME");
        assert_eq!(table.edit_value(0, "qty"), "3");
        assert_eq!(table.edit_value(0, "missing"), "");
    }
}
