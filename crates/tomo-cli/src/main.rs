//! tomo CLI
//!
//! Command-line interface for tomo - folder-organized notes with soft-delete
//! retention, locking, archiving, image attachments, and a companion-device
//! replica.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use tomo_core::{ArchivedSortField, Config, NoteStore, SortField, SortOrder};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};
use prompt::ConfirmGate;

#[derive(Parser)]
#[command(name = "tomo")]
#[command(about = "tomo - folder-organized notes with a companion replica")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },
    /// Recently deleted notes
    Trash {
        #[command(subcommand)]
        command: Option<TrashCommands>,
    },
    /// Archived notes
    Archive {
        /// Sort field for the archive view
        #[arg(long)]
        sort: Option<ArchivedSortFieldArg>,
        /// Sort direction
        #[arg(long)]
        order: Option<SortOrderArg>,
    },
    /// Companion-device sync
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Show status (counts, storage, sync)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create a new note
    #[command(alias = "create")]
    Add {
        /// Folder to file the note in (id, prefix, or name)
        #[arg(short, long)]
        folder: Option<String>,
        /// Note title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Note content
        #[arg(short, long)]
        text: Option<String>,
    },
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only notes in this folder ("unfiled" for loose notes)
        #[arg(short, long)]
        folder: Option<String>,
        /// Include archived notes
        #[arg(long)]
        include_archived: bool,
        /// Show notes in locked folders (asks for authentication)
        #[arg(long)]
        unlock: bool,
        /// Sort field (persisted as the new preference)
        #[arg(long)]
        sort: Option<SortFieldArg>,
        /// Sort direction (persisted as the new preference)
        #[arg(long)]
        order: Option<SortOrderArg>,
        /// Plain list, no date sections
        #[arg(long)]
        flat: bool,
    },
    /// Show note details
    Show {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Edit a note's title or content
    Edit {
        /// Note ID (full UUID or prefix)
        id: String,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Move a note to Recently Deleted
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Restore a note from Recently Deleted
    Restore {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Permanently delete a note and its images
    Purge {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Pin or unpin a note
    Pin {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Lock a note
    Lock {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Unlock a note (asks for authentication)
    Unlock {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Move a note to the archive
    Archive {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Move a note back out of the archive
    Unarchive {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Move a note to a folder (omit --folder to unfile it)
    Move {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Destination folder (id, prefix, or name)
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Search notes by title and first content line
    Search {
        /// Search query
        query: String,
    },
    /// Attach an image file to a note
    Attach {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Path to the image file
        file: String,
        /// Image description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List a note's images
    Images {
        /// Note ID (full UUID or prefix)
        id: String,
    },
    /// Remove an image from a note
    Detach {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Image ID (full UUID or prefix)
        image: String,
    },
    /// Update an image's description
    Describe {
        /// Note ID (full UUID or prefix)
        id: String,
        /// Image ID (full UUID or prefix)
        image: String,
        /// New description
        text: String,
    },
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Create a new folder
    #[command(alias = "create")]
    Add {
        /// Folder name
        name: String,
    },
    /// List folders
    #[command(alias = "ls")]
    List,
    /// Rename a folder
    Rename {
        /// Folder ID (full UUID, prefix, or name)
        id: String,
        /// New name
        name: String,
    },
    /// Delete a folder; its notes become unfiled
    #[command(alias = "rm")]
    Delete {
        /// Folder ID (full UUID, prefix, or name)
        id: String,
    },
    /// Lock a folder
    Lock {
        /// Folder ID (full UUID, prefix, or name)
        id: String,
    },
    /// Unlock a folder (asks for authentication)
    Unlock {
        /// Folder ID (full UUID, prefix, or name)
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum TrashCommands {
    /// List recently deleted notes
    #[command(alias = "ls")]
    List,
    /// Permanently delete everything in the trash
    Empty,
}

#[derive(Subcommand)]
enum SyncCommands {
    /// Serve the store to a companion device
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:7070")]
        bind: String,
    },
    /// Pull a snapshot from the primary (companion side)
    Pull {
        /// Primary URL, e.g. ws://primary-host:7070
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, sync_url, sync_enabled)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortFieldArg {
    LastEdited,
    Title,
}

impl From<SortFieldArg> for SortField {
    fn from(arg: SortFieldArg) -> Self {
        match arg {
            SortFieldArg::LastEdited => SortField::LastEdited,
            SortFieldArg::Title => SortField::Title,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortOrderArg {
    Asc,
    Desc,
}

impl From<SortOrderArg> for SortOrder {
    fn from(arg: SortOrderArg) -> Self {
        match arg {
            SortOrderArg::Asc => SortOrder::Ascending,
            SortOrderArg::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ArchivedSortFieldArg {
    DateArchived,
    LastEdited,
    Title,
}

impl From<ArchivedSortFieldArg> for ArchivedSortField {
    fn from(arg: ArchivedSortFieldArg) -> Self {
        match arg {
            ArchivedSortFieldArg::DateArchived => ArchivedSortField::DateArchived,
            ArchivedSortFieldArg::LastEdited => ArchivedSortField::LastEdited,
            ArchivedSortFieldArg::Title => ArchivedSortField::Title,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let gate = ConfirmGate;

    // Commands that don't need the store
    let command = match cli.command {
        Commands::Config { command } => {
            return match command {
                Some(ConfigCommands::Set { key, value }) => {
                    commands::config::set(key, value, &output)
                }
                Some(ConfigCommands::Show) | None => commands::config::show(&output),
            };
        }
        Commands::Sync {
            command: SyncCommands::Pull { url },
        } => {
            return commands::sync::pull(url, &output).await;
        }
        other => other,
    };

    let config = Config::load()?;
    let mut store = NoteStore::open(&config)?;

    match command {
        Commands::Note { command } => {
            handle_note_command(command, &mut store, &gate, &output).await
        }
        Commands::Folder { command } => {
            handle_folder_command(command, &mut store, &gate, &output).await
        }
        Commands::Trash { command } => match command {
            Some(TrashCommands::Empty) => commands::trash::empty(&mut store, &output),
            Some(TrashCommands::List) | None => commands::trash::list(&store, &output),
        },
        Commands::Archive { sort, order } => commands::archive::list(
            &mut store,
            sort.map(Into::into),
            order.map(Into::into),
            &output,
        ),
        Commands::Sync { command } => match command {
            SyncCommands::Serve { bind } => {
                commands::sync::serve(&mut store, bind, &output).await
            }
            SyncCommands::Pull { .. } => unreachable!(), // Handled above
        },
        Commands::Status => commands::status::show(&store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_note_command(
    command: NoteCommands,
    store: &mut NoteStore,
    gate: &ConfirmGate,
    output: &Output,
) -> Result<()> {
    match command {
        NoteCommands::Add {
            folder,
            title,
            text,
        } => commands::note::add(store, folder, title, text, output),
        NoteCommands::List {
            folder,
            include_archived,
            unlock,
            sort,
            order,
            flat,
        } => {
            commands::note::list(
                store,
                folder,
                include_archived,
                unlock,
                sort.map(Into::into),
                order.map(Into::into),
                flat,
                gate,
                output,
            )
            .await
        }
        NoteCommands::Show { id } => commands::note::show(store, id, gate, output).await,
        NoteCommands::Edit { id, title, text } => {
            commands::note::edit(store, id, title, text, output)
        }
        NoteCommands::Delete { id } => commands::note::delete(store, id, output),
        NoteCommands::Restore { id } => commands::note::restore(store, id, output),
        NoteCommands::Purge { id } => commands::note::purge(store, id, output),
        NoteCommands::Pin { id } => commands::note::pin(store, id, output),
        NoteCommands::Lock { id } => commands::note::lock(store, id, output),
        NoteCommands::Unlock { id } => commands::note::unlock(store, id, gate, output).await,
        NoteCommands::Archive { id } => commands::note::archive(store, id, output),
        NoteCommands::Unarchive { id } => commands::note::unarchive(store, id, output),
        NoteCommands::Move { id, folder } => commands::note::move_note(store, id, folder, output),
        NoteCommands::Search { query } => commands::note::search(store, query, output),
        NoteCommands::Attach {
            id,
            file,
            description,
        } => commands::note::attach(store, id, file, description, output),
        NoteCommands::Images { id } => commands::note::images(store, id, output),
        NoteCommands::Detach { id, image } => commands::note::detach(store, id, image, output),
        NoteCommands::Describe { id, image, text } => {
            commands::note::describe(store, id, image, text, output)
        }
    }
}

async fn handle_folder_command(
    command: FolderCommands,
    store: &mut NoteStore,
    gate: &ConfirmGate,
    output: &Output,
) -> Result<()> {
    match command {
        FolderCommands::Add { name } => commands::folder::add(store, name, output),
        FolderCommands::List => commands::folder::list(store, output),
        FolderCommands::Rename { id, name } => commands::folder::rename(store, id, name, output),
        FolderCommands::Delete { id } => commands::folder::delete(store, id, output),
        FolderCommands::Lock { id } => commands::folder::lock(store, id, output),
        FolderCommands::Unlock { id } => commands::folder::unlock(store, id, gate, output).await,
    }
}
