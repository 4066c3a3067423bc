//! Result normalization, rendering and editing

pub mod edit;
pub mod normalize;
pub mod value;

pub use edit::{CellRef, EditBuffer, ProcessingStats};
pub use normalize::{
    canonical_fields, humanize_field, CanonicalField, Cell, DocumentColumn, FieldKind,
    Pagination, ResultTable, DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS,
};
pub use value::{
    classify, render, rule_name, FieldValue, Record, Rendered, RENDER_RULES, EDIT_PLACEHOLDER,
    EMPTY_MARKER,
};
