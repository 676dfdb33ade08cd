//! fdraft: the command-line entry point for the filter draft editor.
//!
//! # Usage
//!
//! ```text
//! fdraft                       # terminal form (same as `fdraft tui`)
//! fdraft show --format yaml
//! fdraft run "set name Gifts" "set income.types [\"1\"]" save
//! ```

mod logging;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::{debug, info};

use filter_draft_core::command::FilterCommand;
use filter_draft_core::config::{resolve_config_dir, FormConfig, CONFIG_FILE_NAME};
use filter_draft_core::{AppState, FilterCriteria, FilterStore};


#[derive(Debug, Parser)]
#[command(name = "fdraft", version, about = "Edit filter criteria as a draft, then apply it")]
struct Cli {
    /// Form config file (default: <config-dir>/filters.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Commands {
    /// Run the terminal form
    Tui,
    /// Print the initial filters and their date window
    Show {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Apply commands to a fresh store and print the final state
    Run {
        /// e.g. "set name Gifts", "save", "clear"
        #[arg(required = true, value_name = "COMMAND")]
        commands: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}


fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("fdraft: {:#}", e);
        process::exit(1);
    }
}


fn run(cli: Cli) -> Result<()> {
    let config_dir = resolve_config_dir();
    let command = cli.command.unwrap_or(Commands::Tui);

    let log_dir = (command == Commands::Tui).then_some(config_dir.as_path());
    logging::init_logging(cli.verbose, log_dir)?;

    let config = load_config(cli.config.as_deref(), &config_dir)?;
    let store = FilterStore::from_criteria(&config.initial_filters());

    match command {
        Commands::Tui => {
            let tui = filter_draft_tui::tui::Tui::new(&config, store)
                .context("failed to start terminal")?;
            let store = tui.run().context("terminal form failed")?;
            info!(
                pending = store.state().has_draft(),
                revision = store.revision(),
                "form closed"
            );
        }
        Commands::Show { format } => {
            let today = chrono::Local::now().date_naive();
            let doc = show_document(&config.initial_filters(), today);
            println!("{}", render(&doc, format)?);
        }
        Commands::Run { commands } => {
            let state = run_commands(store, &commands)?;
            println!("{}", render(&serde_json::to_value(&state)?, Format::Json)?);
        }
    }
    Ok(())
}


/// An explicit `--config` must exist; the default location may be absent.
fn load_config(explicit: Option<&Path>, config_dir: &Path) -> Result<FormConfig> {
    match explicit {
        Some(path) => FormConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display())),
        None => {
            let path = config_dir.join(CONFIG_FILE_NAME);
            FormConfig::load_or_default(&path)
                .with_context(|| format!("cannot load config {}", path.display()))
        }
    }
}


/// Apply each command in order, stopping at the first that fails.
fn run_commands(mut store: FilterStore, commands: &[String]) -> Result<AppState> {
    for (n, text) in commands.iter().enumerate() {
        let cmd = FilterCommand::parse(text)
            .with_context(|| format!("command {} ('{}')", n + 1, text))?;
        debug!(command = %text, "applying");
        cmd.apply(&mut store)
            .with_context(|| format!("command {} ('{}')", n + 1, text))?;
    }
    Ok(store.snapshot())
}


fn show_document(criteria: &FilterCriteria, today: NaiveDate) -> Value {
    let window = criteria.date_range.window(today).map(|w| {
        json!({
            "start": w.start.format("%Y-%m-%d").to_string(),
            "end": w.end.format("%Y-%m-%d").to_string(),
        })
    });
    json!({
        "filters": criteria.to_value(),
        "dateWindow": window,
    })
}


fn render(value: &Value, format: Format) -> Result<String> {
    let text = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    };
    Ok(text.trim_end().to_string())
}
