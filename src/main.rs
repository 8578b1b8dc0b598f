//! notelog command-line interface.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notelog::cache::{CachePolicy, new_note_cache};
use notelog::note::Note;
use notelog::ops::{self, EditNoteOptions};
use notelog::storage::NoteStore;
use notelog::storage::local::LocalStore;
use notelog::types::NoteId;
use notelog::watch;

const DEFAULT_CACHE_CAPACITY: usize = 16;
const DEFAULT_LIST_SIZE: usize = 10;
const DEFAULT_UPDATE_PERIOD_MS: u64 = 1000;

#[derive(Parser)]
#[command(name = "notelog", version, about = "write and organize notes")]
struct Cli {
    /// Base storage directory (defaults to ~/.notelog)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Notebook to operate on for this invocation
    #[arg(long, global = true)]
    notebook: Option<String>,

    /// Log filter, e.g. "notelog=debug"
    #[arg(long, global = true, default_value = "warn")]
    verbosity: String,

    /// Cache note reads with POLICY: lru, rr, or noop
    #[arg(long, global = true, value_name = "POLICY", value_parser = parse_policy)]
    cache: Option<CachePolicy>,

    /// Cached note capacity
    #[arg(long, global = true, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct EditorArgs {
    /// Text editor command
    #[arg(long, env = "EDITOR", default_value = "vi")]
    editor: String,

    /// Don't save the note in the background while editing
    #[arg(long)]
    no_watch: bool,

    /// Don't record activity in the edit history
    #[arg(long)]
    no_history: bool,

    /// Automatic note update period while editing, in milliseconds
    #[arg(long, default_value_t = DEFAULT_UPDATE_PERIOD_MS)]
    update_period_ms: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new note and open it in the editor
    #[command(visible_alias = "n")]
    New {
        /// Note title; defaults to the current date
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        editor: EditorArgs,
    },
    /// Edit an existing note in the editor
    #[command(visible_alias = "e")]
    Edit {
        /// Note id
        id: NoteId,

        /// Replacement title
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        editor: EditorArgs,
    },
    /// List note info
    Ls {
        /// Show all notes
        #[arg(short, long)]
        all: bool,

        /// Long format
        #[arg(short, long)]
        long: bool,

        /// Show soft-deleted notes
        #[arg(short, long)]
        deleted: bool,

        /// List notes in reverse order
        #[arg(short, long)]
        reverse: bool,

        /// Number of notes to display
        #[arg(short, long, default_value_t = DEFAULT_LIST_SIZE)]
        num: usize,

        /// List column delimiter
        #[arg(long, default_value = " | ")]
        delimiter: String,
    },
    /// Soft-delete a note, or remove its file entirely with --hard
    Rm {
        /// Note id
        id: NoteId,

        /// Remove the note file instead of marking it deleted
        #[arg(long)]
        hard: bool,
    },
    /// Print note details, or notebook metadata when no id is given
    Info {
        /// Note id
        id: Option<NoteId>,
    },
    /// Print the current notebook or manage notebooks
    #[command(visible_alias = "nb")]
    Notebook {
        #[command(subcommand)]
        command: Option<NotebookCommand>,
    },
}

#[derive(Subcommand)]
enum NotebookCommand {
    /// Create a new notebook
    New {
        /// Notebook name
        name: String,
    },
    /// List existing notebooks
    #[command(visible_alias = "ls")]
    List,
    /// Rename a notebook
    #[command(visible_alias = "mv")]
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },
    /// Remove a notebook
    Rm {
        /// Notebook name
        name: String,

        /// Remove the notebook and all of its notes
        #[arg(long)]
        recursive: bool,
    },
}

fn parse_policy(value: &str) -> Result<CachePolicy, String> {
    match value {
        "lru" => Ok(CachePolicy::Lru),
        "rr" => Ok(CachePolicy::Rr),
        "noop" | "none" => Ok(CachePolicy::Noop),
        other => Err(format!("unknown cache policy {other:?}")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.verbosity).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notelog: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let dir = match cli.dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .ok_or("home directory is unknown; pass --dir")?
            .join(".notelog"),
    };

    let engine = Arc::new(LocalStore::open(dir, env!("CARGO_PKG_VERSION"))?);
    if let Some(notebook) = &cli.notebook {
        engine.set_notebook(notebook)?;
    }

    let cached;
    let store: &dyn NoteStore = match cli.cache {
        Some(policy) => {
            cached = new_note_cache(Box::new(Arc::clone(&engine)), policy, cli.cache_capacity);
            &*cached
        }
        None => &*engine,
    };

    match cli.command {
        Command::New { title, editor } => {
            let note = ops::new_note(store, title, String::new())?;
            let note = edit_in_editor(&engine, store, note, None, &editor).await?;
            println!("{:>6}  {}", note.summary.id, note.summary.title);
        }
        Command::Edit { id, title, editor } => {
            let note = store.get_note(id)?;
            let note = edit_in_editor(&engine, store, note, title, &editor).await?;
            println!("{:>6}  {}", note.summary.id, note.summary.title);
        }
        Command::Ls {
            all,
            long,
            deleted,
            reverse,
            num,
            delimiter,
        } => {
            list_notes(store, all, long, deleted, reverse, num, &delimiter)?;
        }
        Command::Rm { id, hard } => {
            ops::remove_note(store, id, hard)?;
        }
        Command::Info { id } => {
            print_info(store, id)?;
        }
        Command::Notebook { command } => {
            notebook_command(store, command)?;
        }
    }

    Ok(())
}

/// Hands the note body to the user's editor, autosaving in the background
/// unless disabled, then applies the final body (and any title change)
/// through the ops layer.
async fn edit_in_editor(
    engine: &Arc<LocalStore>,
    store: &dyn NoteStore,
    note: Note,
    title: Option<String>,
    args: &EditorArgs,
) -> Result<Note, Box<dyn Error>> {
    let scratch = tempfile::Builder::new().prefix("notelog-").tempfile()?;
    std::fs::write(scratch.path(), note.body.as_bytes())?;

    let id = note.summary.id;
    let watcher = if args.no_watch {
        None
    } else {
        Some(watch::spawn_autosave(
            Arc::clone(engine),
            note,
            scratch.path().to_path_buf(),
            Duration::from_millis(args.update_period_ms),
        ))
    };

    let editor_result = run_editor(&args.editor, scratch.path()).await;

    if let Some(watcher) = watcher {
        if let Err(err) = watcher.stop().await {
            tracing::warn!(%err, id, "autosave watcher failed");
        }
    }
    editor_result?;

    let body = std::fs::read_to_string(scratch.path())?;
    let edited = ops::edit_note(
        store,
        id,
        EditNoteOptions {
            title,
            body: Some(body),
            no_history: args.no_history,
        },
    )?;
    Ok(edited)
}

async fn run_editor(editor: &str, path: &Path) -> Result<(), Box<dyn Error>> {
    let editor = editor.to_string();
    let path = path.to_path_buf();
    let status = tokio::task::spawn_blocking(move || {
        std::process::Command::new(&editor).arg(&path).status()
    })
    .await??;

    if !status.success() {
        return Err(format!("editor command exited with {status}").into());
    }
    Ok(())
}

fn list_notes(
    store: &dyn NoteStore,
    all: bool,
    long: bool,
    deleted: bool,
    reverse: bool,
    num: usize,
    delimiter: &str,
) -> Result<(), Box<dyn Error>> {
    let summaries = store.get_all_note_summaries()?;
    let mut ids: Vec<NoteId> = summaries.keys().copied().collect();
    ids.sort_unstable();

    let limit = if all { summaries.len() } else { num };
    let mut lines = Vec::new();
    for id in ids.iter().rev() {
        if lines.len() == limit {
            break;
        }
        let summary = &summaries[id];
        if summary.is_deleted() && !deleted {
            continue;
        }

        let mut fields = vec![format!("{:>6}", summary.id)];
        if deleted {
            let marker = if summary.is_deleted() { "d" } else { " " };
            fields.push(marker.to_string());
        }
        if long {
            fields.push(format_timestamp(summary.created_at_ms));
        }
        fields.push(summary.title.clone());
        lines.push(fields.join(delimiter));
    }

    if !reverse {
        lines.reverse();
    }
    for line in &lines {
        println!("{line}");
    }
    Ok(())
}

fn print_info(store: &dyn NoteStore, id: Option<NoteId>) -> Result<(), Box<dyn Error>> {
    match id {
        Some(id) => {
            let summary = store.get_note_summary(id)?;
            println!("id:      {:>6}", summary.id);
            println!("title:   {}", summary.title);
            println!("created: {}", format_timestamp(summary.created_at_ms));
            if summary.is_deleted() {
                println!("deleted: {}", format_timestamp(summary.deleted_at_ms));
            }
            println!("edits:   {}", summary.history.len());
            if let Some(last) = summary.history.last() {
                println!("updated: {}", format_timestamp(last.updated_at_ms));
                println!("size:    {} bytes", last.size_bytes);
            }
        }
        None => {
            let meta = store.get_meta()?;
            let count = store.get_all_note_summaries()?.len();
            println!("notebook: {}", store.get_notebook());
            println!("version:  {}", meta.version);
            println!("latest:   {}", meta.latest_id);
            println!("notes:    {count}");
            println!("size:     ~{} bytes", meta.approx_size_bytes);
        }
    }
    Ok(())
}

fn notebook_command(
    store: &dyn NoteStore,
    command: Option<NotebookCommand>,
) -> Result<(), Box<dyn Error>> {
    match command {
        None => println!("{}", store.get_notebook()),
        Some(NotebookCommand::New { name }) => {
            store.create_notebook(&name)?;
        }
        Some(NotebookCommand::List) => {
            let mut notebooks = store.list_notebooks();
            notebooks.sort();
            for notebook in &notebooks {
                println!("  {notebook}");
            }
        }
        Some(NotebookCommand::Rename { old, new }) => {
            store.rename_notebook(&old, &new)?;
        }
        Some(NotebookCommand::Rm { name, recursive }) => {
            store.remove_notebook(&name, recursive)?;
        }
    }
    Ok(())
}

fn format_timestamp(ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}
