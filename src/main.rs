use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use compliance_classifier::config::AppConfig;
use compliance_classifier::import;
use compliance_classifier::logging::{init_logging, OperationTimer};
use compliance_classifier::{ClassifierError, Classifier, Database, RuleCreateRequest, RuleStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (overrides configuration and DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a stored message by id
    Classify {
        /// Message identifier
        message_id: i64,
    },
    /// Manage classification rules
    #[command(subcommand)]
    Rule(RuleCommand),
    /// Import physicians
    #[command(subcommand)]
    Physician(ImportCommand),
    /// Import messages
    #[command(subcommand)]
    Message(ImportCommand),
}

#[derive(Subcommand)]
enum RuleCommand {
    /// Create a rule with its keywords
    Add(AddRuleArgs),
    /// Ingest every rule from a JSON rule file
    Load {
        /// Path to a {"rules": [...]} file
        file: PathBuf,
    },
    /// Show a rule and its keywords
    Show {
        /// Rule identifier
        id: String,
    },
}

#[derive(Args)]
struct AddRuleArgs {
    /// Rule identifier
    #[arg(long)]
    id: String,

    /// Rule label
    #[arg(long)]
    name: String,

    /// Keyword selecting this rule (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Action text appended after the name
    #[arg(long)]
    action: Option<String>,

    /// Clause appended after the action
    #[arg(long)]
    requires_append: Option<String>,
}

#[derive(Subcommand)]
enum ImportCommand {
    /// Import records from a CSV file
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        let status = err.downcast_ref::<ClassifierError>().map_or(500, ClassifierError::status_code);
        report_error(status, &format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes file logs on exit
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.json_logs(),
        config.logging.file_path.as_deref().map(Path::new),
    )?;

    info!("Starting compliance-classifier");

    let database_url = cli.database.clone().unwrap_or_else(|| config.get_database_url());
    let db = Database::from_config(&config.database, &database_url)
        .with_context(|| format!("Failed to open database at {database_url}"))?;
    let rules = RuleStore::new(db.clone());

    match cli.command {
        Commands::Classify { message_id } => {
            let classifier = Classifier::new(Box::new(db), rules);
            print_json(&classifier.classify(message_id)?)?;
        }
        Commands::Rule(RuleCommand::Add(args)) => {
            let request = RuleCreateRequest {
                id: args.id,
                name: args.name,
                keywords_any: args.keywords,
                action: args.action,
                requires_append: args.requires_append,
            };
            print_json(&rules.ingest_rule(request)?)?;
        }
        Commands::Rule(RuleCommand::Load { file }) => {
            let timer = OperationTimer::new("load_rules");
            let rule_set = import::load_rule_file(&file)?;
            let count = rules.ingest_rules(rule_set.rules)?;
            timer.finish();
            print_json(&serde_json::json!({ "ingested": count }))?;
        }
        Commands::Rule(RuleCommand::Show { id }) => {
            print_json(&rules.rule_details(&id)?)?;
        }
        Commands::Physician(ImportCommand::Import { file }) => {
            let timer = OperationTimer::new("import_physicians");
            let count = import::import_physicians(&db, &file)?;
            timer.finish();
            print_json(&serde_json::json!({ "imported": count }))?;
        }
        Commands::Message(ImportCommand::Import { file }) => {
            let timer = OperationTimer::new("import_messages");
            let count = import::import_messages(&db, &file)?;
            timer.finish();
            print_json(&serde_json::json!({ "imported": count }))?;
        }
    }

    Ok(())
}

/// Failures are reported as a `{"status", "detail"}` object on stderr
#[allow(clippy::print_stderr)]
fn report_error(status: u16, detail: &str) {
    eprintln!("{}", serde_json::json!({ "status": status, "detail": detail }));
}

/// Command results go to stdout as JSON; logs go to stderr
#[allow(clippy::print_stdout)]
fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
