//! Plain-text rendering of schemas and results

use crate::api::{format_timestamp, ExtractionResult, Schema};
use crate::results::{Pagination, ProcessingStats, ResultTable, EMPTY_MARKER};

const MAX_CELL_CHARS: usize = 40;

pub fn print_schema_list(schemas: &[Schema]) {
    if schemas.is_empty() {
        println!("No schemas found. Create one with `schemas create --file <draft.json>`.");
        return;
    }

    let id_width = schemas.iter().map(|s| s.id.chars().count()).max().unwrap_or(2).max(2);
    let name_width = schemas.iter().map(|s| s.name.chars().count()).max().unwrap_or(4).max(4);

    println!(
        "{:<id_width$}  {:<name_width$}  {:>6}  UPDATED",
        "ID",
        "NAME",
        "FIELDS",
        id_width = id_width,
        name_width = name_width
    );
    for schema in schemas {
        let updated = schema
            .updated_at
            .as_deref()
            .or(schema.created_at.as_deref())
            .map(format_timestamp)
            .unwrap_or_else(|| EMPTY_MARKER.to_string());
        println!(
            "{:<id_width$}  {:<name_width$}  {:>6}  {}",
            schema.id,
            schema.name,
            schema.fields.len(),
            updated,
            id_width = id_width,
            name_width = name_width
        );
    }
}

pub fn print_schema(schema: &Schema) {
    println!("{} ({})", schema.name, schema.id);
    if let Some(description) = schema.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", description);
    }
    println!();

    let name_width = schema
        .fields
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0);
    for field in &schema.fields {
        let required = if field.required { "*" } else { " " };
        println!(
            "  {}{:<width$}  {:<10}  {}",
            required,
            field.name,
            field.field_type.label(),
            field.description.as_deref().unwrap_or(""),
            width = name_width
        );
    }
}

pub fn print_stats(stats: &ProcessingStats) {
    println!(
        "Processed {} document(s): {} succeeded, {} failed ({}% success rate)",
        stats.total, stats.success, stats.failed, stats.success_rate
    );
    println!();
}

/// Field-major grid, one block per page of document columns.
pub fn print_table(table: &ResultTable<'_>) {
    if table.columns().is_empty() || table.fields().is_empty() {
        println!("No extracted data.");
        return;
    }

    let pagination = Pagination::default();
    let pages = pagination.page_count(table.columns().len());
    let labels: Vec<String> = table.fields().iter().map(|f| f.label()).collect();
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(5).max(5);

    for page in 0..pages {
        let columns = table.page(Pagination { page, ..pagination });
        if pages > 1 {
            println!("Page {} of {}", page + 1, pages);
        }

        let grid: Vec<Vec<String>> = table
            .fields()
            .iter()
            .map(|field| {
                columns
                    .iter()
                    .map(|column| {
                        let cell = table.cell(column.index, &field.name);
                        if cell.is_placeholder {
                            EMPTY_MARKER.to_string()
                        } else {
                            truncate(&cell.text)
                        }
                    })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(col, column)| {
                grid.iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(column.title().chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut header = format!("{:<width$}", "Field", width = label_width);
        for (column, width) in columns.iter().zip(&widths) {
            header.push_str(&format!(" | {:<width$}", column.title(), width = width));
        }
        println!("{}", header);
        println!("{}", "-".repeat(header.chars().count()));

        for (label, row) in labels.iter().zip(&grid) {
            let mut line = format!("{:<width$}", label, width = label_width);
            for (text, width) in row.iter().zip(&widths) {
                line.push_str(&format!(" | {:<width$}", text, width = width));
            }
            println!("{}", line.trim_end());
        }
        println!();
    }
}

/// One card per successful document with multi-line values.
pub fn print_cards(table: &ResultTable<'_>) {
    for column in table.columns() {
        println!("=== {} ===", column.filename);
        for (label, rendered) in table.document_view(column.index) {
            let lines = rendered.to_lines();
            match lines.as_slice() {
                [single] => println!("  {}: {}", label, single),
                _ => {
                    println!("  {}:", label);
                    for line in lines {
                        println!("    {}", line);
                    }
                }
            }
        }
        println!();
    }
}

/// Pretty JSON of each successful document's current data, edits included.
pub fn print_raw(results: &[ExtractionResult]) -> serde_json::Result<()> {
    for result in results {
        if let Some(raw) = raw_data(result)? {
            println!("=== {} (raw) ===", result.filename);
            println!("{}", raw);
            println!();
        }
    }
    Ok(())
}

fn raw_data(result: &ExtractionResult) -> serde_json::Result<Option<String>> {
    result.fields().map(serde_json::to_string_pretty).transpose()
}

pub fn print_failures(failures: &[String]) {
    if failures.is_empty() {
        return;
    }
    println!("Failed documents:");
    for failure in failures {
        println!("  {}", failure);
    }
    println!();
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_CELL_CHARS {
        let head: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
