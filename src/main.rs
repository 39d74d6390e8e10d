//! Spark2Scale - founder dashboard from the terminal.
//!
//! Lists a startup's documents grouped by type and drives workflow stages
//! against the Spark2Scale backend.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spark2scale::documents::{normalize_records, RawDocumentRecord};
use spark2scale::integrations::UploadRequest;
use spark2scale::{
    aggregate, select_path, Backend, Config, CoreError, DocumentGroup, DocumentLoader,
    StageActions, StageName, VersionSelection, WorkflowController, WorkflowStage,
};

/// Founder dashboard for Spark2Scale
#[derive(Parser)]
#[command(name = "spark2scale")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default search
    #[arg(long, global = true, env = "SPARK2SCALE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Founder documents grouped by type
    Docs {
        /// Documents operation
        #[command(subcommand)]
        operation: DocsOperation,
    },

    /// Workflow stage status, generation and completion
    Stage {
        /// Stage operation
        #[command(subcommand)]
        operation: StageOperation,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum DocsOperation {
    /// List a startup's documents, one entry per document type
    List {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Print the file path for a document type and version
    #[command(disable_version_flag = true)]
    Open {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// Document type (e.g. "Financials")
        #[arg(short = 't', long = "type")]
        doc_type: String,

        /// Version ID, or "latest"
        #[arg(long)]
        version: Option<String>,
    },

    /// Upload a file as a new document
    Upload {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// File to upload
        #[arg(long)]
        file: PathBuf,

        /// Document type (e.g. "Legal Docs")
        #[arg(short = 't', long = "type")]
        doc_type: String,

        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Group a local JSON export of document records without contacting the backend
    Aggregate {
        /// JSON file holding an array of document records
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },
}

#[derive(Subcommand)]
enum StageOperation {
    /// Show a stage's status and available actions
    Status {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// Stage name (defaults to workflow.default_stage)
        #[arg(long)]
        stage: Option<StageName>,
    },

    /// Generate (or regenerate) a stage's artifact
    Generate {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// Stage name (defaults to workflow.default_stage)
        #[arg(long)]
        stage: Option<StageName>,
    },

    /// Mark a stage as complete
    Complete {
        /// Startup ID
        #[arg(short, long)]
        startup: String,

        /// Stage name (defaults to workflow.default_stage)
        #[arg(long)]
        stage: Option<StageName>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; only the variables it would have set are absent.
    let _ = dotenvy::dotenv();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    // Handle commands
    match cli.command {
        Commands::Docs { operation } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_docs(&config, operation)?;
        }
        Commands::Stage { operation } => {
            let config = load_config(cli.config.as_deref())?;
            cmd_stage(&config, operation)?;
        }
        Commands::Config { path } => {
            cmd_config(cli.config.as_deref(), path)?;
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_with_override(path),
        None => Config::load(),
    }
}

fn backend(config: &Config) -> Result<Backend> {
    Backend::http(&config.api).context("Failed to set up backend client")
}

fn output_format(requested: Option<String>, config: &Config) -> Result<String> {
    let format = requested.unwrap_or_else(|| config.output.format.clone());
    match format.as_str() {
        "text" | "json" => Ok(format),
        other => anyhow::bail!("Unknown output format '{}' (expected text or json)", other),
    }
}

fn cmd_docs(config: &Config, operation: DocsOperation) -> Result<()> {
    // Create tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    let backend = backend(config)?;
    let loader = DocumentLoader::new(backend.documents.clone());

    rt.block_on(async {
        match operation {
            DocsOperation::List { startup, format } => {
                let format = output_format(format, config)?;

                let aggregation = loader
                    .load(&startup)
                    .await
                    .with_context(|| format!("Failed to load documents for startup {}", startup))?;

                print_warnings(&aggregation.warnings);
                print_groups(&aggregation.groups, &format)?;

                if !aggregation.is_complete() {
                    eprintln!(
                        "{} of {} document type(s) may be missing versions",
                        aggregation.warnings.len(),
                        aggregation.groups.len()
                    );
                }
            }

            DocsOperation::Open { startup, doc_type, version } => {
                let aggregation = loader
                    .load(&startup)
                    .await
                    .with_context(|| format!("Failed to load documents for startup {}", startup))?;

                let group = aggregation.group(&doc_type).ok_or_else(|| {
                    anyhow::anyhow!("No '{}' documents for startup {}", doc_type, startup)
                })?;

                let selection = VersionSelection::from(version.as_deref());
                if let VersionSelection::Version(ref id) = selection {
                    if group.version(id).is_none() {
                        eprintln!("Warning: version {} not found, opening latest", id);
                    }
                }

                println!("{}", select_path(group, &selection));
            }

            DocsOperation::Upload { startup, file, doc_type, name } => {
                let contents = tokio::fs::read(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let file_name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());

                let request = UploadRequest {
                    startup_id: startup,
                    doc_name: name.unwrap_or_else(|| file_name.clone()),
                    doc_type,
                    file_name,
                    contents,
                };

                println!("Uploading {}...", file.display());

                match backend.documents.upload(request).await {
                    Ok(raw) => {
                        println!("Uploaded document {} ({})", raw.id, raw.name);
                    }
                    Err(e) => {
                        anyhow::bail!("Failed to upload {}: {}", file.display(), e);
                    }
                }
            }

            DocsOperation::Aggregate { file, format } => {
                let format = output_format(format, config)?;
                cmd_docs_aggregate(&file, &format)?;
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

fn cmd_docs_aggregate(file: &Path, format: &str) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: Vec<RawDocumentRecord> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of document records", file.display()))?;

    let records = normalize_records(raw)?;
    let groups = aggregate(records)?;
    print_groups(&groups, format)
}

fn print_warnings(warnings: &[CoreError]) {
    for warning in warnings {
        let level = if warning.is_partial() { "Warning" } else { "Error" };
        eprintln!("{}: {}", level, warning);
    }
}

fn print_groups(groups: &[DocumentGroup], format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("  No documents found.");
        return Ok(());
    }

    for group in groups {
        println!("{}", format_group(group));
    }
    println!("\n{} document type(s)", groups.len());
    Ok(())
}

fn format_group(group: &DocumentGroup) -> String {
    let mut out = format!(
        "{}: {} (updated {})",
        group.owner_type,
        group.name,
        group.updated_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(latest) = group.latest_version() {
        out.push_str(&format!(" latest v{}", latest.version_number));
    }

    if group.versions.is_empty() {
        out.push_str("\n    no version history");
    }
    for version in &group.versions {
        out.push_str(&format!(
            "\n    v{} {} {}",
            version.version_number,
            version.created_at.format("%Y-%m-%d %H:%M"),
            version.id
        ));
    }
    out
}

fn cmd_stage(config: &Config, operation: StageOperation) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let controller = WorkflowController::from_backend(&backend(config)?);
    let default_stage = config.workflow.default_stage;

    rt.block_on(async {
        match operation {
            StageOperation::Status { startup, stage } => {
                let stage = stage.unwrap_or(default_stage);
                let outcome = controller.status_or_default(&startup, stage).await;

                if let Some(ref e) = outcome.error {
                    eprintln!("Warning: {} (showing stage as not completed)", e);
                }
                print_stage(&outcome.stage, &controller.actions(&startup, stage));
            }

            StageOperation::Generate { startup, stage } => {
                let stage = stage.unwrap_or(default_stage);
                println!("Generating {} for startup {}...", stage.artifact_type(), startup);

                match controller.generate_artifact(&startup, stage).await {
                    Ok(artifact) => {
                        if let Some(ref message) = artifact.message {
                            println!("{}", message);
                        }
                        print_warnings(&artifact.warnings);
                        print_stage(&controller.view(&startup, stage), &controller.actions(&startup, stage));
                    }
                    Err(e) => {
                        anyhow::bail!("Failed to generate {}: {}", stage, e);
                    }
                }
            }

            StageOperation::Complete { startup, stage } => {
                let stage = stage.unwrap_or(default_stage);

                match controller.complete_stage(&startup, stage).await {
                    Ok(()) => {
                        println!("Marked {} complete for startup {}", stage, startup);
                    }
                    Err(e) => {
                        anyhow::bail!("Failed to complete {}: {}", stage, e);
                    }
                }
            }
        }

        Ok::<(), anyhow::Error>(())
    })
}

fn print_stage(stage: &WorkflowStage, actions: &StageActions) {
    let button = |b: &spark2scale::workflow::ActionButton| {
        if b.enabled {
            format!("[{}]", b.label)
        } else {
            format!("({})", b.label)
        }
    };

    println!("{} for startup {}: {}", stage.stage, stage.startup_id, stage.state());
    println!("  artifact: {}", if stage.artifact_exists { "yes" } else { "no" });
    println!("  actions: {} {}", button(&actions.generate), button(&actions.complete));
}

fn cmd_config(path_override: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        let path = path_override
            .map(Path::to_path_buf)
            .or_else(Config::find_config_file)
            .or_else(|| Config::config_dir().map(|d| d.join("config.toml")));

        match path {
            Some(path) => println!("{}", path.display()),
            None => println!("No config directory available"),
        }
        return Ok(());
    }

    let config = load_config(path_override)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "spark2scale", &mut io::stdout());
}
