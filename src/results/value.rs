//! Value shapes of extracted data and how each one is rendered
//!
//! Extracted values are arbitrary JSON. [`classify`] maps a value onto the
//! [`FieldValue`] variant chosen by the first matching entry of
//! [`RENDER_RULES`]; the order of that table is the rendering precedence.

use serde_json::{Map, Value};

/// Marker shown for null or absent values
pub const EMPTY_MARKER: &str = "—";

/// Marker shown in editable cells that have no value yet
pub const EDIT_PLACEHOLDER: &str = "Click to add";

/// Shape of one extracted value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// null / missing
    Empty,
    /// Array of sub-records ("formulation group") or scalars
    Records(&'a [Value]),
    /// Object carrying `Max`/`Min`, collapsed to one summary line
    Range(&'a Map<String, Value>),
    /// Object carrying an `error` key
    Failure {
        error: &'a Value,
        details: Option<&'a Value>,
    },
    /// Any other object
    Object(&'a Map<String, Value>),
    Flag(bool),
    /// Strings and numbers
    Text(&'a Value),
}

/// One entry of the rendering dispatch table
pub struct RenderRule {
    pub name: &'static str,
    matcher: fn(&Value) -> Option<FieldValue<'_>>,
}

impl RenderRule {
    pub fn apply<'a>(&self, value: &'a Value) -> Option<FieldValue<'a>> {
        (self.matcher)(value)
    }
}

/// Rendering rules, highest priority first.
pub static RENDER_RULES: [RenderRule; 7] = [
    RenderRule {
        name: "empty",
        matcher: |v| v.is_null().then_some(FieldValue::Empty),
    },
    RenderRule {
        name: "records",
        matcher: |v| v.as_array().map(|items| FieldValue::Records(items)),
    },
    RenderRule {
        name: "range",
        matcher: |v| {
            v.as_object()
                .filter(|obj| obj.contains_key("Max") || obj.contains_key("Min"))
                .map(FieldValue::Range)
        },
    },
    RenderRule {
        name: "error",
        matcher: |v| {
            let obj = v.as_object()?;
            let error = obj.get("error")?;
            Some(FieldValue::Failure {
                error,
                details: obj.get("details"),
            })
        },
    },
    RenderRule {
        name: "object",
        matcher: |v| v.as_object().map(FieldValue::Object),
    },
    RenderRule {
        name: "flag",
        matcher: |v| v.as_bool().map(FieldValue::Flag),
    },
    RenderRule {
        name: "text",
        matcher: |v| Some(FieldValue::Text(v)),
    },
];

/// Classify a value by the first matching rule.
pub fn classify(value: &Value) -> FieldValue<'_> {
    RENDER_RULES
        .iter()
        .find_map(|rule| rule.apply(value))
        .unwrap_or(FieldValue::Text(value))
}

/// Name of the rule that decides how `value` is rendered.
pub fn rule_name(value: &Value) -> &'static str {
    RENDER_RULES
        .iter()
        .find(|rule| rule.apply(value).is_some())
        .map(|rule| rule.name)
        .unwrap_or("text")
}

/// One item of a rendered array
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Object item, one `(key, value)` line per entry
    Fields(Vec<(String, String)>),
    /// Scalar item
    Text(String),
}

/// Display tree produced by [`render`]
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Empty,
    Records(Vec<Record>),
    Summary(String),
    Callout {
        error: String,
        details: Option<String>,
    },
    Blocks(Vec<(String, Rendered)>),
    Text(String),
}

/// Render a value according to [`RENDER_RULES`].
pub fn render(value: &Value) -> Rendered {
    match classify(value) {
        FieldValue::Empty => Rendered::Empty,
        FieldValue::Records(items) => Rendered::Records(items.iter().map(render_record).collect()),
        FieldValue::Range(obj) => Rendered::Summary(
            obj.iter()
                .map(|(k, v)| format!("{}: {}", k, render(v).to_inline()))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        FieldValue::Failure { error, details } => Rendered::Callout {
            error: render(error).to_inline(),
            details: details.map(|d| render(d).to_inline()),
        },
        FieldValue::Object(obj) => Rendered::Blocks(
            obj.iter()
                .map(|(k, v)| (k.clone(), render(v)))
                .collect(),
        ),
        FieldValue::Flag(flag) => Rendered::Text(if flag { "Yes" } else { "No" }.to_string()),
        FieldValue::Text(v) => Rendered::Text(scalar_text(v)),
    }
}

fn render_record(item: &Value) -> Record {
    match item.as_object() {
        Some(obj) => Record::Fields(
            obj.iter()
                .map(|(k, v)| (k.clone(), render(v).to_inline()))
                .collect(),
        ),
        None => Record::Text(render(item).to_inline()),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => EMPTY_MARKER.to_string(),
        other => other.to_string(),
    }
}

impl Record {
    fn to_inline(&self) -> String {
        match self {
            Record::Fields(fields) => fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
            Record::Text(text) => text.clone(),
        }
    }
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        matches!(self, Rendered::Empty)
    }

    /// Single-line form, used for table cells and spreadsheet output.
    pub fn to_inline(&self) -> String {
        match self {
            Rendered::Empty => EMPTY_MARKER.to_string(),
            Rendered::Text(text) | Rendered::Summary(text) => text.clone(),
            Rendered::Callout { error, details } => match details {
                Some(details) => format!("Error: {} ({})", error, details),
                None => format!("Error: {}", error),
            },
            Rendered::Records(records) => records
                .iter()
                .map(Record::to_inline)
                .collect::<Vec<_>>()
                .join(" | "),
            Rendered::Blocks(blocks) => blocks
                .iter()
                .map(|(k, r)| format!("{}: {}", k, r.to_inline()))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Multi-line form with nested content indented, used for card views.
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Rendered::Empty | Rendered::Text(_) | Rendered::Summary(_) => vec![self.to_inline()],
            Rendered::Callout { error, details } => {
                let mut lines = vec![format!("Error: {}", error)];
                if let Some(details) = details {
                    lines.push(format!("  Details: {}", details));
                }
                lines
            }
            Rendered::Records(records) => {
                let mut lines = Vec::new();
                for (index, record) in records.iter().enumerate() {
                    match record {
                        Record::Fields(fields) => {
                            lines.push(format!("#{}", index + 1));
                            lines.extend(fields.iter().map(|(k, v)| format!("  {}: {}", k, v)));
                        }
                        Record::Text(text) => lines.push(format!("- {}", text)),
                    }
                }
                lines
            }
            Rendered::Blocks(blocks) => {
                let mut lines = Vec::new();
                for (key, rendered) in blocks {
                    match rendered {
                        Rendered::Empty | Rendered::Text(_) | Rendered::Summary(_) => {
                            lines.push(format!("{}: {}", key, rendered.to_inline()));
                        }
                        nested => {
                            lines.push(format!("{}:", key));
                            lines.extend(nested.to_lines().into_iter().map(|l| format!("  {}", l)));
                        }
                    }
                }
                lines
            }
        }
    }
}
