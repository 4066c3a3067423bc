//! Command-line front end
//!
//! Drives the same [`Wizard`] a graphical front end would, printing
//! notifications and progress to stderr and command output to stdout.

mod output;

use crate::api::{ApiClient, ExtractionApi, FieldType, Schema};
use crate::config::{ClientConfig, BASE_URL_ENV};
use crate::schema::{FieldDraft, SchemaDraft};
use crate::upload::{format_file_size, validate_selection, PdfUpload};
use crate::wizard::{NoticeLevel, ProgressState, Wizard, WizardConfig};
use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "extraction-wizard",
    version,
    about = "Extract structured fields from PDF documents through the extraction backend"
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// API base URL
    #[arg(long, global = true, env = BASE_URL_ENV, value_name = "URL")]
    pub base_url: Option<String>,

    /// Timeout for upload, schema and processing calls
    #[arg(long, global = true, default_value_t = 300, value_name = "SECS")]
    pub upload_timeout_secs: u64,

    /// Timeout for the export download
    #[arg(long, global = true, default_value_t = 60, value_name = "SECS")]
    pub export_timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn client_config(&self) -> crate::Result<ClientConfig> {
        let mut config = match self.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => ClientConfig::with_base_url(url)?,
            _ => ClientConfig::from_env()?,
        };
        config.upload_timeout = Duration::from_secs(self.upload_timeout_secs);
        config.export_timeout = Duration::from_secs(self.export_timeout_secs);
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Manage extraction schemas
    Schemas {
        #[command(subcommand)]
        action: SchemaAction,
    },
    /// Upload a PDF, process it with a schema, show and export the results
    Run(RunArgs),
}

#[derive(Debug, Subcommand)]
pub enum SchemaAction {
    /// List stored schemas
    List,
    /// Show the fields of one schema
    Show {
        /// Schema id or name
        schema: String,
    },
    /// Print a draft with the default fields, ready to edit and create
    Template,
    /// Create a schema from a JSON draft
    Create {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Replace a schema with a JSON draft
    Update {
        id: String,
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete a schema
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// PDF document to process
    pub pdf: PathBuf,

    /// Schema id or name
    #[arg(long)]
    pub schema: String,

    /// Directory for the exported spreadsheet
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Correct an extracted value before export (document numbers start at 1)
    #[arg(long = "set", value_name = "DOC:FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Show one card per document instead of the table
    #[arg(long)]
    pub cards: bool,

    /// Also print each document's data as JSON
    #[arg(long)]
    pub raw: bool,

    /// Leave the server-side session open
    #[arg(long)]
    pub keep_session: bool,
}

/// A `--set` edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// 1-based document number
    pub document: usize,
    pub field: String,
    pub value: String,
}

pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DOC:FIELD=VALUE, got '{}'", raw))?;
    let (document, field) = target
        .split_once(':')
        .ok_or_else(|| format!("expected DOC:FIELD before '=', got '{}'", target))?;
    let document: usize = document
        .trim()
        .parse()
        .map_err(|_| format!("invalid document number '{}'", document))?;
    if document == 0 {
        return Err("document numbers start at 1".to_string());
    }
    let field = field.trim();
    if field.is_empty() {
        return Err("field name is empty".to_string());
    }
    Ok(Assignment {
        document,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Schema draft as read from and written to JSON files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<DraftFieldFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftFieldFile {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl From<DraftFile> for SchemaDraft {
    fn from(file: DraftFile) -> Self {
        let mut draft = SchemaDraft::new(file.name);
        draft.description = file.description;
        draft.fields = file
            .fields
            .into_iter()
            .map(|f| {
                let mut field = FieldDraft::new(f.name, FieldType::Text);
                field.field_type = f.field_type;
                field.description = f.description;
                field.required = f.required;
                field
            })
            .collect();
        draft
    }
}

impl From<&SchemaDraft> for DraftFile {
    fn from(draft: &SchemaDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            fields: draft
                .fields
                .iter()
                .map(|f| DraftFieldFile {
                    name: f.name.clone(),
                    field_type: f.field_type,
                    description: f.description.clone(),
                    required: f.required,
                })
                .collect(),
        }
    }
}

fn read_draft(path: &Path) -> anyhow::Result<SchemaDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file: DraftFile = serde_json::from_str(&text)
        .with_context(|| format!("Invalid schema draft in {}", path.display()))?;
    Ok(file.into())
}

/// Find a schema by exact id, then by case-insensitive name.
pub fn find_schema<'a>(schemas: &'a [Schema], key: &str) -> Option<&'a Schema> {
    schemas
        .iter()
        .find(|s| s.id == key)
        .or_else(|| schemas.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
}

/// Execute a parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.connection.client_config()?;
    tracing::debug!(base_url = %config.base_url, "Using extraction backend");
    let api = ApiClient::new(config)?;

    match cli.command {
        Commands::Health => {
            let status = api.health().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::Schemas { action } => run_schema_action(api, action).await,
        Commands::Run(args) => run_wizard(api, args).await,
    }
}

async fn run_schema_action(api: ApiClient, action: SchemaAction) -> anyhow::Result<()> {
    let mut wizard = Wizard::new(api);

    let outcome = match action {
        SchemaAction::List => wizard.list_schemas().await.map(|schemas| {
            output::print_schema_list(&schemas);
        }),
        SchemaAction::Show { schema } => {
            let schemas = wizard.list_schemas().await?;
            let Some(found) = find_schema(&schemas, &schema) else {
                bail!("Schema not found: {}", schema);
            };
            output::print_schema(found);
            Ok(())
        }
        SchemaAction::Template => {
            let mut draft = SchemaDraft::new("Manufacturing quotation");
            draft.use_default_fields();
            println!("{}", serde_json::to_string_pretty(&DraftFile::from(&draft))?);
            Ok(())
        }
        SchemaAction::Create { file } => {
            let draft = read_draft(&file)?;
            wizard
                .save_schema(&draft, None)
                .await
                .map(|schema| println!("{}", schema.id))
        }
        SchemaAction::Update { id, file } => {
            let draft = read_draft(&file)?;
            wizard
                .save_schema(&draft, Some(&id))
                .await
                .map(|schema| println!("{}", schema.id))
        }
        SchemaAction::Delete { id } => wizard.delete_schema(&id).await,
    };

    report_notices(&mut wizard);
    Ok(outcome?)
}

async fn run_wizard<A: ExtractionApi + 'static>(api: A, args: RunArgs) -> anyhow::Result<()> {
    let upload = PdfUpload::from_path(&args.pdf)
        .with_context(|| format!("Failed to read {}", args.pdf.display()))?;
    validate_selection(std::slice::from_ref(&upload))?;

    let mut wizard = Wizard::with_config(Arc::new(api), WizardConfig::default());
    let outcome = drive(&mut wizard, &upload, &args).await;
    report_notices(&mut wizard);

    if !args.keep_session {
        if let Some(teardown) = wizard.reset() {
            // Teardown failures are logged by the task itself
            let _ = teardown.await;
        }
        wizard.take_notices();
    }
    outcome
}

async fn drive<A: ExtractionApi + 'static>(
    wizard: &mut Wizard<A>,
    upload: &PdfUpload,
    args: &RunArgs,
) -> anyhow::Result<()> {
    eprintln!("{}", wizard.step());
    let file = wizard.upload_file(upload).await?;
    report_notices(wizard);
    eprintln!("  {} ({})", file.original_name, format_file_size(file.size_bytes));

    eprintln!("{}", wizard.step());
    let schemas = wizard.list_schemas().await?;
    let Some(schema) = find_schema(&schemas, &args.schema).cloned() else {
        bail!("Schema not found: {}", args.schema);
    };
    wizard.select_schema(schema)?;
    report_notices(wizard);

    eprintln!("{}", wizard.step());
    let mut progress = wizard.subscribe_progress();
    let printer = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = *progress.borrow_and_update();
            if let (ProgressState::Running { label, .. }, Some(percent)) =
                (state, state.percent())
            {
                eprintln!("  [{:>3}%] {}", percent, label);
            }
        }
    });
    let processed = wizard.process().await;
    printer.abort();
    let stats = processed?;
    report_notices(wizard);

    eprintln!("{}", wizard.step());
    for assignment in &args.set {
        apply_assignment(wizard, assignment)?;
    }

    output::print_stats(&stats);
    let table = wizard.table();
    if args.cards {
        output::print_cards(&table);
    } else {
        output::print_table(&table);
    }
    output::print_failures(&table.failures());
    if args.raw {
        output::print_raw(wizard.buffer().editable_results())?;
    }

    let exported = wizard.export(&args.out).await?;
    report_notices(wizard);
    println!("{}", exported.path.display());
    Ok(())
}

fn apply_assignment<A: ExtractionApi + 'static>(
    wizard: &mut Wizard<A>,
    assignment: &Assignment,
) -> anyhow::Result<()> {
    wizard.start_edit(assignment.document - 1, &assignment.field)?;
    wizard.set_edit_value(assignment.value.as_str());
    if wizard.commit_edit().is_none() {
        bail!(
            "Could not edit {} of document {}",
            assignment.field,
            assignment.document
        );
    }
    tracing::info!(
        document = assignment.document,
        field = %assignment.field,
        "Applied edit"
    );
    Ok(())
}

fn report_notices<A: ExtractionApi + 'static>(wizard: &mut Wizard<A>) {
    for notice in wizard.take_notices() {
        // Errors surface through the returned error
        if notice.level == NoticeLevel::Success {
            eprintln!("✓ {}", notice.message);
        }
    }
}
