//! `acr` - terminal front end for AI Code Reviewer.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use acr_client::{
    ApiClient, DEFAULT_SERVER_URL, FileStore, HistoryEntry, HistoryStore, View, Workspace,
};

/// Review and generate code with GROQ-powered AI
#[derive(Parser)]
#[command(name = "acr")]
#[command(version)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "ACR_SERVER_URL", default_value = DEFAULT_SERVER_URL, global = true)]
    server: String,

    /// Directory holding the interaction history
    #[arg(long, env = "ACR_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the server is up
    Health,

    /// Review code read from a file, or stdin when no file is given
    Review {
        /// Source file ("-" for stdin)
        file: Option<PathBuf>,

        /// Language of the code
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Generate code from a description
    Generate {
        /// What the code should do
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,

        /// Target language
        #[arg(short, long)]
        language: Option<String>,

        /// Also write the code to generated.<language> in this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List past interactions, newest first
    History {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Count past reviews and generations
    Stats,

    /// Load a past interaction back into its form
    Replay {
        /// Index as shown by `acr history`
        index: usize,

        /// Submit the loaded form again
        #[arg(long)]
        run: bool,
    },
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_history(data_dir: Option<PathBuf>) -> anyhow::Result<HistoryStore<FileStore>> {
    let store = match data_dir {
        Some(dir) => FileStore::new(dir)?,
        None => FileStore::default_location()?,
    };
    Ok(HistoryStore::open(store))
}

fn record(history: &mut HistoryStore<FileStore>, entry: HistoryEntry) {
    if let Err(e) = history.append(entry) {
        warn!(error = %e, "Failed to save history");
    }
}

fn read_source(file: Option<PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            std::io::stdin()
                .read_to_string(&mut code)
                .context("Failed to read stdin")?;
            Ok(code)
        }
    }
}

fn print_form(workspace: &Workspace) {
    match workspace.active() {
        View::Review => {
            let form = &workspace.review;
            println!("[review] language: {}", form.language);
            println!("{}", form.code);
        }
        View::Generate => {
            let form = &workspace.generate;
            println!("[generate] language: {}", form.language);
            println!("{}", form.description);
            if !form.code.is_empty() {
                println!("\n{}", form.code);
            }
        }
    }
}

/// Submit the active form, record it, and print its output.
async fn submit(
    workspace: &mut Workspace,
    api: &ApiClient,
    history: &mut HistoryStore<FileStore>,
) -> bool {
    let (outcome, output) = match workspace.active() {
        View::Review => {
            let outcome = workspace.review.submit(api).await;
            (outcome, &workspace.review.result)
        }
        View::Generate => {
            let outcome = workspace.generate.submit(api).await;
            (outcome, &workspace.generate.code)
        }
    };

    match outcome {
        Ok(entry) => {
            println!("{output}");
            record(history, entry);
            true
        }
        Err(_) => {
            eprintln!("{output}");
            false
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let api = ApiClient::new(&cli.server);

    match cli.command {
        Command::Health => {
            let status = api.health().await?;
            println!("{status}");
            Ok(status == "ok")
        }
        Command::Review { file, language } => {
            let mut history = open_history(cli.data_dir)?;
            let mut workspace = Workspace::new();
            workspace.review.code = read_source(file)?;
            if let Some(language) = language {
                workspace.review.language = language;
            }
            Ok(submit(&mut workspace, &api, &mut history).await)
        }
        Command::Generate {
            description,
            language,
            output,
        } => {
            let mut history = open_history(cli.data_dir)?;
            let mut workspace = Workspace::new();
            workspace.switch_to(View::Generate);
            workspace.generate.description = description.join(" ");
            if let Some(language) = language {
                workspace.generate.language = language;
            }

            let ok = submit(&mut workspace, &api, &mut history).await;
            if let Some(dir) = output.filter(|_| ok) {
                let path = dir.join(workspace.generate.file_name());
                std::fs::write(&path, &workspace.generate.code)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Saved to {}", path.display());
            }
            Ok(ok)
        }
        Command::History { limit } => {
            let history = open_history(cli.data_dir)?;
            if history.is_empty() {
                println!("No history yet");
            }
            let limit = limit.unwrap_or(history.len());
            for (index, entry) in history.entries().iter().take(limit).enumerate() {
                let when = entry
                    .local_time()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default();
                println!("{index:>3}  {} - {}  {when}", entry.kind(), entry.language());
            }
            Ok(true)
        }
        Command::Stats => {
            let stats = open_history(cli.data_dir)?.stats();
            println!("Reviews: {}", stats.reviews);
            println!("Generations: {}", stats.generations);
            Ok(true)
        }
        Command::Replay { index, run } => {
            let mut history = open_history(cli.data_dir)?;
            let command = history
                .select(index)
                .with_context(|| format!("No history entry at index {index}"))?;

            let mut workspace = Workspace::new();
            workspace.apply(command);

            if run {
                Ok(submit(&mut workspace, &api, &mut history).await)
            } else {
                print_form(&workspace);
                Ok(true)
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
