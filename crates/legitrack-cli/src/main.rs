mod display;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use legitrack_core::{Annotations, Config, DataPaths, Position, Priority, RowFilter};
use legitrack_scan::{ScanOptions, Scanner};
use legitrack_store::{
    KeywordsFile, NotesFile, TrackedFile, TrackerExport, store_upload, write_tracked_export,
};
use legitrack_sync::{AUTO_UPDATE_MESSAGE, DurableStore, GitStore, LegiScanClient, LocalOnly};
use tracing::{Level, info, warn};

#[derive(Parser, Debug)]
#[command(name = "legitrack", version)]
#[command(about = "Track LegiScan bills: incremental scans, CSV export, notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON: api_key, data_dir, repo_dir, repo_url, base_url, call_delay_ms)
    #[arg(long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Directory holding keywords, cache, exports and notes
    #[arg(long, global = true, env = "LEGITRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LegiScan API key
    #[arg(long, global = true, env = "LEGISCAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Pull the data repository first and push after a scan or an edit
    #[arg(long, global = true)]
    sync: bool,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search LegiScan and add new or changed bills to the export
    Scan {
        /// Postal codes, `US` for Congress, or `ALL` (the default)
        jurisdictions: Vec<String>,
        /// Keywords file; defaults to keywords.json in the data directory
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Abort the scan after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Pause between API calls, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Browse the export
    Search {
        /// Matches title, sponsors, description, bill number or committees
        term: Option<String>,
        /// `State` or `Federal`
        #[arg(long)]
        level: Vec<String>,
        /// Jurisdiction name, e.g. `California`
        #[arg(long)]
        jurisdiction: Vec<String>,
        #[arg(long)]
        keyword: Vec<String>,
        /// Status code or label, e.g. `2` or `In Committee`
        #[arg(long)]
        status: Vec<String>,
        #[arg(long)]
        position: Vec<Position>,
        #[arg(long)]
        priority: Vec<Priority>,
        /// Only tracked bills
        #[arg(long)]
        tracked: bool,
        /// Print full cards instead of one line per bill
        #[arg(long)]
        detail: bool,
    },

    /// Track a bill by number
    Track { bill: String },

    /// Stop tracking a bill
    Untrack { bill: String },

    /// Add or change the note on a bill
    Note {
        bill: String,
        #[arg(long)]
        comment: Option<String>,
        /// Related link; replaces the existing links when given
        #[arg(long = "link")]
        links: Vec<String>,
        /// File to attach; copied into the uploads directory
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Support, Oppose, Watch, or none
        #[arg(long)]
        position: Option<Position>,
        /// High, Medium, Low, or none
        #[arg(long)]
        priority: Option<Priority>,
    },

    /// Write tracked bills and their notes to Tracked_Bills_Export.csv
    ExportTracked,

    /// Manage search keywords
    Keywords {
        #[command(subcommand)]
        action: KeywordsAction,
    },

    /// Pull or push the data repository
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
}

impl Commands {
    /// Whether the command changes keywords, tracking or notes.
    fn edits_data(&self) -> bool {
        match self {
            Commands::Track { .. } | Commands::Untrack { .. } | Commands::Note { .. } => true,
            Commands::Keywords { action } => !matches!(action, KeywordsAction::List),
            _ => false,
        }
    }
}

#[derive(Subcommand, Debug)]
enum KeywordsAction {
    List,
    Add {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    Remove {
        #[arg(required = true)]
        terms: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SyncAction {
    Pull,
    Push {
        #[arg(long, default_value = AUTO_UPDATE_MESSAGE)]
        message: String,
    },
}

/// Resolved settings: flags and env over the config file over defaults.
struct Settings {
    config: Config,
    paths: DataPaths,
    api_key: Option<String>,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let config = Config::load(&cli.config)?;
        let data_dir = cli
            .data_dir
            .clone()
            .or_else(|| config.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let api_key = cli
            .api_key
            .clone()
            .or_else(|| Some(config.api_key.clone()))
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            config,
            paths: DataPaths::new(data_dir),
            api_key,
        })
    }

    fn durable_store(&self) -> Box<dyn DurableStore> {
        match (&self.config.repo_dir, &self.config.repo_url) {
            (Some(dir), url) => Box::new(GitStore::new(dir, url.clone())),
            (None, Some(url)) => Box::new(GitStore::new(&self.paths.root, Some(url.clone()))),
            (None, None) => Box::new(LocalOnly),
        }
    }

    fn load_rows(&self) -> Result<Vec<legitrack_core::FlatRow>> {
        let path = self.paths.export();
        TrackerExport::new(&path)
            .read()
            .with_context(|| format!("reading {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::resolve(&cli)?;
    let sync = cli.sync;
    let sync_edit = sync && cli.command.edits_data();
    if sync_edit && let Err(e) = settings.durable_store().pull().await {
        warn!(error = %e, "sync pull failed, editing local data");
    }

    match cli.command {
        Commands::Scan {
            jurisdictions,
            keywords,
            timeout,
            delay_ms,
        } => {
            scan(
                &settings,
                &jurisdictions,
                keywords.as_deref(),
                timeout.map(Duration::from_secs),
                delay_ms.map(Duration::from_millis),
                sync,
            )
            .await?
        }
        Commands::Search {
            term,
            level,
            jurisdiction,
            keyword,
            status,
            position,
            priority,
            tracked,
            detail,
        } => {
            let filter = RowFilter {
                search: term,
                levels: level,
                jurisdictions: jurisdiction,
                keywords: keyword,
                statuses: status,
                positions: position,
                priorities: priority,
                tracked_only: tracked,
            };
            search(&settings, &filter, detail)?
        }
        Commands::Track { bill } => set_tracked(&settings, &bill, true)?,
        Commands::Untrack { bill } => set_tracked(&settings, &bill, false)?,
        Commands::Note {
            bill,
            comment,
            links,
            files,
            position,
            priority,
        } => {
            let edit = NoteEdit {
                comment,
                links,
                files,
                position,
                priority,
            };
            note(&settings, &bill, edit)?
        }
        Commands::ExportTracked => export_tracked(&settings)?,
        Commands::Keywords { action } => keywords(&settings, action)?,
        Commands::Sync { action } => {
            let store = settings.durable_store();
            match action {
                SyncAction::Pull => store.pull().await.context("sync pull failed")?,
                SyncAction::Push { message } => {
                    store.push(&message).await.context("sync push failed")?
                }
            }
        }
    }

    if sync_edit && let Err(e) = settings.durable_store().push(AUTO_UPDATE_MESSAGE).await {
        warn!(error = %e, "sync push failed");
    }
    Ok(())
}

async fn scan(
    settings: &Settings,
    jurisdictions: &[String],
    keywords: Option<&Path>,
    timeout: Option<Duration>,
    delay: Option<Duration>,
    sync: bool,
) -> Result<()> {
    let Some(api_key) = settings.api_key.as_deref() else {
        bail!("no LegiScan API key: pass --api-key, set LEGISCAN_API_KEY, or add api_key to the config");
    };

    let store = settings.durable_store();
    if sync && let Err(e) = store.pull().await {
        warn!(error = %e, "sync pull failed, scanning local data");
    }

    let client = LegiScanClient::new(settings.config.base_url(), api_key)
        .context("building HTTP client")?;
    let options = ScanOptions {
        call_delay: delay.unwrap_or_else(|| settings.config.call_delay()),
    };
    let mut scanner = Scanner::new(client, settings.paths.clone()).with_options(options);
    if let Some(path) = keywords {
        scanner = scanner.with_keywords_file(path);
    }

    let report = match timeout {
        Some(limit) => scanner.run_with_timeout(jurisdictions, limit).await,
        None => scanner.run(jurisdictions).await,
    }
    .context("scan failed")?;

    match report.export_rows {
        Some(total) => println!(
            "{} new or updated bills; {} rows in {}",
            report.new_rows,
            total,
            settings.paths.export().display()
        ),
        None => println!("No new or updated bills."),
    }
    println!(
        "  searched {} pairs, {} hits, {} unchanged, {} fetch failures",
        report.stats.pairs, report.stats.hits, report.stats.unchanged, report.stats.fetch_failures
    );

    if sync && let Err(e) = store.push(AUTO_UPDATE_MESSAGE).await {
        warn!(error = %e, "sync push failed");
    }
    Ok(())
}

fn search(settings: &Settings, filter: &RowFilter, detail: bool) -> Result<()> {
    let rows = settings.load_rows()?;
    let tracked = TrackedFile::new(settings.paths.tracked()).load()?;
    let notes = NotesFile::new(settings.paths.notes()).load()?;
    let annotations = Annotations {
        tracked: &tracked,
        notes: &notes,
    };

    let matches = filter.apply(&rows, annotations);
    for row in &matches {
        let is_tracked = tracked.contains(&row.bill_number);
        if detail {
            display::print_bill_card(row, notes.get(&row.bill_number), is_tracked);
        } else {
            display::print_row_line(row, is_tracked);
        }
    }
    println!("{} of {} rows", matches.len(), rows.len());
    Ok(())
}

fn set_tracked(settings: &Settings, bill: &str, track: bool) -> Result<()> {
    let file = TrackedFile::new(settings.paths.tracked());
    let mut tracked = file.load()?;
    let changed = if track {
        tracked.track(bill)
    } else {
        tracked.untrack(bill)
    };
    if changed {
        file.save(&tracked)?;
    }
    match (track, changed) {
        (true, true) => println!("Now tracking {bill}"),
        (true, false) => println!("{bill} is already tracked"),
        (false, true) => println!("Stopped tracking {bill}"),
        (false, false) => println!("{bill} was not tracked"),
    }
    Ok(())
}

struct NoteEdit {
    comment: Option<String>,
    links: Vec<String>,
    files: Vec<PathBuf>,
    position: Option<Position>,
    priority: Option<Priority>,
}

fn note(settings: &Settings, bill: &str, edit: NoteEdit) -> Result<()> {
    let file = NotesFile::new(settings.paths.notes());
    let mut notes = file.load()?;
    let note = notes.entry(bill.to_string()).or_default();

    if let Some(comment) = edit.comment {
        note.comment = comment;
    }
    if !edit.links.is_empty() {
        note.links = edit
            .links
            .iter()
            .flat_map(|l| l.split(','))
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(position) = edit.position {
        note.position = position;
    }
    if let Some(priority) = edit.priority {
        note.priority = priority;
    }
    for source in &edit.files {
        let stored = store_upload(&settings.paths.uploads(), bill, source)
            .with_context(|| format!("attaching {}", source.display()))?;
        let stored = stored.to_string_lossy().into_owned();
        if !note.files.contains(&stored) {
            note.files.push(stored);
        }
    }

    let shown = note.clone();
    file.save(&notes)?;
    info!(bill, "saved note");
    display::print_note(&shown);
    Ok(())
}

fn export_tracked(settings: &Settings) -> Result<()> {
    let rows = settings.load_rows()?;
    let tracked = TrackedFile::new(settings.paths.tracked()).load()?;
    let notes = NotesFile::new(settings.paths.notes()).load()?;
    let path = settings.paths.tracked_export();
    let written = write_tracked_export(&path, &rows, &tracked, &notes)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("{written} rows written to {}", path.display());
    Ok(())
}

fn keywords(settings: &Settings, action: KeywordsAction) -> Result<()> {
    let file = KeywordsFile::new(settings.paths.keywords());
    let mut current = file.load_or_default()?;
    let list = match action {
        KeywordsAction::List => current,
        KeywordsAction::Add { terms } => {
            current.extend(terms);
            file.save(&current)?
        }
        KeywordsAction::Remove { terms } => {
            current.retain(|k| !terms.iter().any(|t| t.eq_ignore_ascii_case(k)));
            file.save(&current)?
        }
    };
    for keyword in &list {
        println!("{keyword}");
    }
    Ok(())
}
