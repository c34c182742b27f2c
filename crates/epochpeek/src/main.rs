use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use epochpeek_core::{SelectionWatcher, Settings, StatusBar, TokioScheduler};
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod parse;
mod scan;
mod terminal;

use terminal::{OscClipboard, WatchInput};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find Unix timestamps in text and show them as UTC", long_about = None)]
struct Cli {
    /// Settings file (defaults to $EPOCHPEEK_CONFIG or ./epochpeek.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the first timestamp in TEXT (or stdin) as ISO-8601 UTC
    Parse(ParseArgs),
    /// Report the timestamp found on each line of a file
    Scan(ScanArgs),
    /// Treat stdin lines as selection events and show the debounced result
    Watch,
    /// Inspect or change persisted settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
struct ParseArgs {
    text: Option<String>,
    /// Explain on stderr why no timestamp was found
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug)]
struct ScanArgs {
    file: PathBuf,
    /// Print JSON lines instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective settings
    Show,
    /// Persist the debug flag
    SetDebug {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.unwrap_or_else(Settings::default_path);

    match cli.command {
        Command::Parse(args) => handle_parse(args),
        Command::Scan(args) => handle_scan(args),
        Command::Watch => {
            let settings = load_settings(&config_path)?;
            handle_watch(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(command) => {
            handle_config(command, &config_path)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::load(path)
        .with_context(|| format!("Failed to load settings from '{}'", path.display()))?;
    settings
        .apply_env_overrides()
        .context("Failed to apply environment overrides")?;
    Ok(settings)
}

fn handle_parse(args: ParseArgs) -> Result<ExitCode> {
    let text = match args.text {
        Some(text) => text,
        None => parse::read_text(std::io::stdin().lock())?,
    };

    let found = parse::run(
        &text,
        args.explain,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )?;
    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn handle_scan(args: ScanArgs) -> Result<ExitCode> {
    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("Failed to open '{}'", args.file.display()))?;
    let rows = scan::scan_lines(BufReader::new(file))
        .with_context(|| format!("Failed to read '{}'", args.file.display()))?;

    if args.json {
        for line in scan::render_json_lines(&rows)? {
            println!("{line}");
        }
    } else {
        println!("{}", scan::render_table(&rows));
    }

    let found = rows.iter().filter(|row| row.timestamp.is_some()).count();
    info!(lines = rows.len(), found, "scan complete");
    Ok(ExitCode::SUCCESS)
}

async fn handle_watch(settings: Settings) -> Result<()> {
    let status = Arc::new(StatusBar::with_listener(|text| {
        if text.is_empty() {
            println!("status: (cleared)");
        } else {
            println!("status: {text}");
        }
    }));
    let linger = settings.selection_debounce().max(settings.pointer_settle());
    let watcher = SelectionWatcher::new(TokioScheduler::current(), status.clone(), settings);
    info!(settings = ?watcher.settings(), "watching stdin for selections");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?
    {
        match WatchInput::parse(&line) {
            WatchInput::Quit => break,
            WatchInput::Copy => {
                let outcome = status
                    .copy(&OscClipboard)
                    .context("Failed to copy status text")?;
                if let Some(notice) = outcome.notice() {
                    println!("{notice}");
                }
            }
            WatchInput::PointerUp(text) => watcher.on_pointer_up(text),
            WatchInput::Selection(text) => watcher.on_selection_changed(text),
        }
    }

    // Let the last selection settle before exiting.
    debug!(?linger, "input closed, waiting for pending timers");
    tokio::time::sleep(linger).await;
    watcher.shutdown();
    Ok(())
}

fn handle_config(command: ConfigCommand, path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let settings = load_settings(path)?;
            println!("# {}", path.display());
            print!("{}", settings.to_toml_string()?);
        }
        ConfigCommand::SetDebug { enabled } => {
            let mut settings = Settings::load(path)
                .with_context(|| format!("Failed to load settings from '{}'", path.display()))?;
            settings.debug = enabled;
            settings
                .save(path)
                .with_context(|| format!("Failed to save settings to '{}'", path.display()))?;
            println!("debug = {enabled} (saved to {})", path.display());
        }
    }
    Ok(())
}
