//! Command-line host for the daily-note maintenance engine.
//!
//! # Responsibility
//! - Translate host lifecycle events (run command, ribbon open, note created,
//!   note deleted) into `dailynote_core` service calls.
//! - Expose settings and copy-pair editing plus heading/folder pickers.
//!
//! # Invariants
//! - All behavior lives in `dailynote_core`; this binary only wires storage,
//!   logging and argument parsing.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use dailynote_core::text::fuzzy::fuzzy_match;
use dailynote_core::text::embed::parse_reference_date;
use dailynote_core::text::{expand_for, list_headings, parse_moment, ReferenceDate};
use dailynote_core::{
    default_log_level, init_logging, init_stderr_logging, open_db, CopyPair, FsVault, NoteId,
    SettingsRepository, SettingsService, SqliteSettingsRepository, TransitionOutcome,
    TransitionReport, TransitionService, VaultLayout,
};
use log::info;

const SETTINGS_DIR: &str = ".dailynote";
const SETTINGS_DB_FILE: &str = "settings.sqlite3";

#[derive(Debug, Parser)]
#[command(
    name = "dailynote",
    about = "Daily-note lifecycle maintenance for a markdown vault",
    version
)]
struct Cli {
    /// Vault root directory.
    #[arg(long)]
    vault: PathBuf,
    /// Settings database. Defaults to `<vault>/.dailynote/settings.sqlite3`.
    #[arg(long)]
    db: Option<PathBuf>,
    /// trace | debug | info | warn | error
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    /// Write rolling log files here instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the daily note when missing, then process it.
    Run(DateArgs),
    /// Ensure the daily note exists, process it once, and print its path.
    Open(DateArgs),
    /// Notify that a file was created; daily notes get processed.
    Created {
        /// Vault-relative or absolute path of the new file.
        path: PathBuf,
    },
    /// Notify that a note was deleted; updates the processing log.
    Deleted {
        /// Note identity or file path.
        note: String,
    },
    /// Print a file with embeddable tokens expanded, without writing it.
    Expand(ExpandArgs),
    /// Show or edit settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Edit the ordered content-copy pairs.
    #[command(subcommand)]
    Pairs(PairsCommand),
    /// List template headings, optionally filtered by a fuzzy query.
    Headings { query: Option<String> },
    /// List vault folders, optionally filtered by a fuzzy query.
    Folders { query: Option<String> },
}

#[derive(Debug, Args)]
struct DateArgs {
    /// Target date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Emit the transition report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ExpandArgs {
    /// Reference date. Defaults to the date named by the file's basename.
    #[arg(long)]
    date: Option<NaiveDate>,
    file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Print all settings as JSON.
    Show,
    /// Set one field by its camelCase name; VALUE is JSON or bare text.
    Set { field: String, value: String },
}

#[derive(Debug, Subcommand)]
enum PairsCommand {
    List,
    Add { source: String, dest: String },
    Up { index: usize },
    Down { index: usize },
    Remove { index: usize },
    Set {
        index: usize,
        source: String,
        dest: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logging(&cli.log_level, cli.log_dir.as_deref())?;

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| default_db_path(&cli.vault));
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open settings database {}", db_path.display()))?;
    let repo = SqliteSettingsRepository::try_new(&conn).context("settings store not ready")?;
    let settings = repo.load().context("failed to load settings")?;
    let vault = FsVault::new(&cli.vault, VaultLayout::from_settings(&settings));

    match cli.command {
        Commands::Run(args) => handle_run(&vault, &repo, args),
        Commands::Open(args) => handle_open(&vault, &repo, args),
        Commands::Created { path } => handle_created(&vault, &repo, &path),
        Commands::Deleted { note } => handle_deleted(&vault, &repo, &note),
        Commands::Expand(args) => handle_expand(&vault, args),
        Commands::Settings(command) => handle_settings(&repo, command),
        Commands::Pairs(command) => handle_pairs(&repo, command),
        Commands::Headings { query } => handle_headings(&vault, query.as_deref()),
        Commands::Folders { query } => handle_folders(&vault, query.as_deref()),
    }
}

fn init_cli_logging(level: &str, log_dir: Option<&Path>) -> Result<()> {
    let outcome = match log_dir {
        Some(dir) => {
            let cwd = std::env::current_dir().context("cannot resolve current directory")?;
            let dir = resolve_log_dir(dir, &cwd);
            init_logging(level, &dir.to_string_lossy())
        }
        None => init_stderr_logging(level),
    };
    outcome.map_err(anyhow::Error::msg)
}

fn handle_run(vault: &FsVault, repo: &SqliteSettingsRepository<'_>, args: DateArgs) -> Result<()> {
    let date = args.date.unwrap_or_else(today);
    let service = TransitionService::new(vault, repo);
    let report = service
        .run_for_date(date)
        .with_context(|| format!("daily note transition failed for {date}"))?;
    print_report(&report, args.json)
}

fn handle_open(vault: &FsVault, repo: &SqliteSettingsRepository<'_>, args: DateArgs) -> Result<()> {
    let date = args.date.unwrap_or_else(today);
    let service = TransitionService::new(vault, repo);
    let report = service
        .run_for_date(date)
        .with_context(|| format!("failed to open daily note for {date}"))?;
    if args.json {
        print_report(&report, true)?;
    }
    println!("{}", vault.note_path(&report.note).display());
    Ok(())
}

fn handle_created(
    vault: &FsVault,
    repo: &SqliteSettingsRepository<'_>,
    path: &Path,
) -> Result<()> {
    let Some(note) = vault.note_id_for_path(path) else {
        info!(
            "event=note_created module=cli status=skip reason=not_daily_note path={}",
            path.display()
        );
        println!("ignored: {} is not a daily note", path.display());
        return Ok(());
    };
    let service = TransitionService::new(vault, repo);
    let report = service
        .run(&note)
        .with_context(|| format!("daily note transition failed for {note}"))?;
    print_report(&report, false)
}

fn handle_deleted(
    vault: &FsVault,
    repo: &SqliteSettingsRepository<'_>,
    note: &str,
) -> Result<()> {
    let note = note_from_arg(note);
    let service = TransitionService::new(vault, repo);
    let changed = service
        .note_deleted(&note)
        .with_context(|| format!("failed to record deletion of {note}"))?;
    if changed {
        println!("processing log updated for {note}");
    } else {
        println!("{note} was not in the processing log");
    }
    Ok(())
}

fn handle_expand(vault: &FsVault, args: ExpandArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let (note, date) = expansion_reference(vault, &args.file, args.date);
    print!("{}", expand_for(&text, ReferenceDate::new(note.as_str(), date)));
    Ok(())
}

fn handle_settings(repo: &SqliteSettingsRepository<'_>, command: SettingsCommand) -> Result<()> {
    let service = SettingsService::new(repo);
    let settings = match command {
        SettingsCommand::Show => service.load().context("failed to load settings")?,
        SettingsCommand::Set { field, value } => service
            .set_field(&field, &value)
            .with_context(|| format!("failed to set `{field}`"))?,
    };
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn handle_pairs(repo: &SqliteSettingsRepository<'_>, command: PairsCommand) -> Result<()> {
    let service = SettingsService::new(repo);
    let pairs = match command {
        PairsCommand::List => service.load()?.copy_content_headings,
        PairsCommand::Add { source, dest } => service.add_pair(&source, &dest)?,
        PairsCommand::Up { index } => service.move_pair_up(index)?,
        PairsCommand::Down { index } => service.move_pair_down(index)?,
        PairsCommand::Remove { index } => service.remove_pair(index)?,
        PairsCommand::Set {
            index,
            source,
            dest,
        } => service.set_pair(index, &source, &dest)?,
    };
    for line in format_pairs(&pairs) {
        println!("{line}");
    }
    Ok(())
}

fn handle_headings(vault: &FsVault, query: Option<&str>) -> Result<()> {
    let template = vault.read_template().context("failed to read template")?;
    for heading in list_headings(&template)
        .into_iter()
        .filter(|heading| fuzzy_match(heading, query.unwrap_or_default()))
    {
        println!("{heading}");
    }
    Ok(())
}

fn handle_folders(vault: &FsVault, query: Option<&str>) -> Result<()> {
    let folders = vault
        .list_folders(query.unwrap_or_default())
        .context("failed to list vault folders")?;
    for folder in folders {
        println!("{folder}");
    }
    Ok(())
}

fn print_report(report: &TransitionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    match report.outcome {
        TransitionOutcome::AlreadyProcessed => {
            println!("{}: already processed", report.note);
        }
        TransitionOutcome::Processed => {
            println!(
                "{}: processed (previous: {}, writes: {})",
                report.note,
                report.previous.as_ref().map_or("none", NoteId::as_str),
                report.writes
            );
            for outcome in &report.steps {
                println!("  {} {}", outcome.step, outcome.status);
            }
        }
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn default_db_path(vault: &Path) -> PathBuf {
    vault.join(SETTINGS_DIR).join(SETTINGS_DB_FILE)
}

fn resolve_log_dir(dir: &Path, cwd: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    }
}

/// Accepts either a bare identity or a note path (`Daily/2024-03-04.md`).
fn note_from_arg(arg: &str) -> NoteId {
    let path = Path::new(arg);
    let is_markdown = path.extension().is_some_and(|ext| ext == "md");
    match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if is_markdown || path.parent().is_some_and(|p| !p.as_os_str().is_empty()) => {
            NoteId::new(stem)
        }
        _ => NoteId::new(arg),
    }
}

/// Identity and date a file is expanded against. Without `--date`, the file
/// stem is read with the vault's date format, then as an ISO-like date.
fn expansion_reference(
    vault: &FsVault,
    file: &Path,
    date: Option<NaiveDate>,
) -> (NoteId, Option<NaiveDate>) {
    if let Some(date) = date {
        return (vault.note_id_for_date(date), Some(date));
    }
    let note = note_from_arg(&file.to_string_lossy());
    let date = parse_moment(note.as_str(), &vault.layout().date_format)
        .or_else(|| parse_reference_date(note.as_str()));
    (note, date)
}

fn format_pairs(pairs: &[CopyPair]) -> Vec<String> {
    pairs
        .iter()
        .enumerate()
        .map(|(index, pair)| format!("{index}: {:?} -> {:?}", pair.source, pair.dest))
        .collect()
}
