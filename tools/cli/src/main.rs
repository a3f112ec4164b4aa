//! DocMirror CLI - Command line interface for the document mirror.
//!
//! This tool provides a command-line surface over the reconciliation
//! engine: save, load, list, delete, clear, storage info, and manual
//! conflict resolution.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use docmirror_engine::{Listing, MirrorEngine};
use docmirror_registry::JsonFileStore;
use docmirror_storage::create_default_registry;

/// Environment variable holding the Dropbox access token.
const DROPBOX_TOKEN_ENV: &str = "DOCMIRROR_DROPBOX_TOKEN";
/// Environment variable holding the Google Drive access token.
const GDRIVE_TOKEN_ENV: &str = "DOCMIRROR_GDRIVE_TOKEN";

#[derive(Parser)]
#[command(name = "docmirror")]
#[command(about = "DocMirror - Local documents mirrored to cloud storage")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the local registry blob (defaults to the user data dir).
    #[arg(long)]
    store: Option<PathBuf>,

    /// Cloud provider to mirror to: "dropbox" or "gdrive".
    #[arg(short, long)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a document.
    Save {
        /// Document name.
        name: String,

        /// Document content (mutually exclusive with --file).
        content: Option<String>,

        /// Read content from a file instead.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print a document's content.
    Load {
        /// Document name.
        name: String,
    },

    /// List all documents and any conflicts.
    List,

    /// Delete a document.
    Delete {
        /// Document name.
        name: String,
    },

    /// Wipe the local registry (remote copies are left intact).
    Clear,

    /// Show storage usage.
    Info,

    /// Resolve a conflict by uploading a local-only document.
    Upload {
        /// Document name.
        name: String,
    },

    /// Resolve a conflict by discarding a local-only document.
    Discard {
        /// Document name.
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let engine = build_engine(cli.store, cli.provider.as_deref())?;

    match cli.command {
        Commands::Save {
            name,
            content,
            file,
        } => cmd_save(&engine, &name, content, file).await,

        Commands::Load { name } => cmd_load(&engine, &name).await,

        Commands::List => cmd_list(&engine).await,

        Commands::Delete { name } => cmd_delete(&engine, &name).await,

        Commands::Clear => cmd_clear(&engine).await,

        Commands::Info => cmd_info(&engine).await,

        Commands::Upload { name } => cmd_upload(&engine, &name).await,

        Commands::Discard { name } => cmd_discard(&engine, &name).await,
    }
}

/// Default blob location under the user data directory.
fn default_store_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine the user data directory")?;
    Ok(base.join("docmirror").join("files.json"))
}

/// Construct the engine from the store path and optional provider name.
fn build_engine(store: Option<PathBuf>, provider: Option<&str>) -> Result<MirrorEngine> {
    let path = match store {
        Some(path) => path,
        None => default_store_path()?,
    };
    let store = Arc::new(JsonFileStore::new(&path).context("Failed to open the local registry")?);

    let Some(name) = provider else {
        return Ok(MirrorEngine::new(store));
    };

    let token_env = match name {
        "dropbox" => DROPBOX_TOKEN_ENV,
        "gdrive" => GDRIVE_TOKEN_ENV,
        other => anyhow::bail!("Unknown provider '{}'. Use: dropbox or gdrive", other),
    };
    let token = std::env::var(token_env)
        .with_context(|| format!("Provider '{}' requires {} to be set", name, token_env))?;

    let registry = create_default_registry();
    let provider = registry
        .resolve(name, serde_json::json!({ "token": token }))
        .context("Failed to configure provider")?;

    Ok(MirrorEngine::with_provider(store, provider))
}

/// Save a document from an argument or a file.
async fn cmd_save(
    engine: &MirrorEngine,
    name: &str,
    content: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let content = match (content, file) {
        (Some(content), None) => content,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => anyhow::bail!("Provide content inline or via --file, not both"),
    };

    let receipt = engine
        .save_file(name, &content)
        .await
        .context("Failed to save file")?;

    println!("Saved {} ({} bytes)", receipt.file.name, receipt.file.size);
    match (&receipt.file.synced_provider, &receipt.sync_error) {
        (Some(provider), _) => println!("Synced to {}", provider),
        (None, Some(e)) => println!("Warning: saved locally, but sync failed: {}", e),
        (None, None) => {}
    }

    Ok(())
}

/// Print a document's content.
async fn cmd_load(engine: &MirrorEngine, name: &str) -> Result<()> {
    let file = engine.load_file(name).await.context("Failed to load file")?;
    print!("{}", file.content);
    Ok(())
}

/// List all documents and conflicts.
async fn cmd_list(engine: &MirrorEngine) -> Result<()> {
    let Listing { files, conflicts } = engine.list_files().await.context("Failed to list files")?;

    if files.is_empty() {
        println!("No files stored.");
        return Ok(());
    }

    for file in &files {
        let sync = file
            .synced_provider
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unsynced".to_string());
        println!("  {} ({} bytes, {})", file.name, file.size, sync);
    }

    if !conflicts.is_empty() {
        println!("\nConflicts (local-only; resolve with 'upload' or 'discard'):");
        for file in &conflicts {
            println!("  {}", file.name);
        }
    }

    Ok(())
}

/// Delete a document.
async fn cmd_delete(engine: &MirrorEngine, name: &str) -> Result<()> {
    engine
        .delete_file(name)
        .await
        .context("Failed to delete file")?;
    println!("Deleted {}", name);
    Ok(())
}

/// Wipe the local registry.
async fn cmd_clear(engine: &MirrorEngine) -> Result<()> {
    engine.clear_all().await.context("Failed to clear registry")?;
    println!("Local registry cleared. Remote files were left intact.");
    Ok(())
}

/// Show storage usage.
async fn cmd_info(engine: &MirrorEngine) -> Result<()> {
    let info = engine
        .storage_info()
        .await
        .context("Failed to read storage info")?;

    println!("Storage:");
    println!("  Files: {}", info.file_count);
    println!("  Used: {} bytes", info.used);
    println!("  Available: {} bytes", info.available);
    println!("  Total: {} bytes", info.total);

    Ok(())
}

/// Upload a local-only document to resolve its conflict.
async fn cmd_upload(engine: &MirrorEngine, name: &str) -> Result<()> {
    let record = engine
        .file_info(name)
        .await
        .context("Failed to look up file")?
        .with_context(|| format!("No file named '{}'", name))?;

    engine
        .upload_local_only_file(&record)
        .await
        .context("Failed to upload file")?;

    println!("Uploaded {}", name);
    Ok(())
}

/// Discard a local-only document to resolve its conflict.
async fn cmd_discard(engine: &MirrorEngine, name: &str) -> Result<()> {
    engine
        .discard_local_only_file(name)
        .await
        .context("Failed to discard file")?;
    println!("Discarded {}", name);
    Ok(())
}
