//! localshare: command-line client for a local media share server.
//!
//! Stages files (or a folder, packed into a zip archive) and uploads them to
//! the server as one multipart request with progress output. Set
//! LOCALSHARE_SERVER_URL (or pass --server) to point at the server.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use localshare_cli::{human_size, init_tracing, partition};
use localshare_core::models::{PickedFile, UploadMode, UploadStatus};
use localshare_core::{ClientConfig, PreferenceStore, Theme};
use localshare_preview::LocalPreviewStore;
use localshare_services::StagingStore;
use localshare_upload::{HttpTransport, UploadPipeline};

#[derive(Parser)]
#[command(name = "localshare", about = "Local media share CLI")]
struct Cli {
    /// Server base URL (overrides LOCALSHARE_SERVER_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage files (or a folder) and upload them
    Share {
        /// Files to upload, or a single directory in folder mode
        paths: Vec<PathBuf>,
        /// Upload mode: media, all, or folder
        #[arg(long, default_value = "media")]
        mode: String,
    },
    /// Show or set the persisted theme preference
    Theme {
        /// "dark" or "light"; omit to print the current theme
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to load configuration")?;
    if let Some(server) = cli.server {
        config.server_url = server.trim_end_matches('/').to_string();
    }

    match cli.command {
        Commands::Share { paths, mode } => {
            let mode: UploadMode = mode.parse()?;
            run_share(config, paths, mode).await?;
        }
        Commands::Theme { value } => {
            run_theme(&config, value)?;
        }
    }

    Ok(())
}

async fn run_share(config: ClientConfig, paths: Vec<PathBuf>, mode: UploadMode) -> anyhow::Result<()> {
    if paths.is_empty() {
        anyhow::bail!("No files selected");
    }

    let previews = Arc::new(
        LocalPreviewStore::new(config.preview_dir.clone())
            .await
            .context("Failed to open preview spool directory")?,
    );
    let store = StagingStore::shared(previews);

    {
        let mut staging = store.lock().await;
        match mode {
            UploadMode::Folder => {
                if paths.len() != 1 || !paths[0].is_dir() {
                    anyhow::bail!("Folder mode expects exactly one directory");
                }
                let entries = collect_folder(&paths[0])?;
                staging.stage_folder(entries).await?;
            }
            UploadMode::Media | UploadMode::AllFiles => {
                let mut picked = Vec::with_capacity(paths.len());
                for path in &paths {
                    picked.push(read_picked(path)?);
                }
                let (accepted, skipped) =
                    partition(picked, |file| mode.accepts(&file.content_type));
                for file in &skipped {
                    tracing::warn!(
                        name = %file.name,
                        content_type = %file.content_type,
                        "Skipping non-media file in media mode"
                    );
                }
                if accepted.is_empty() {
                    anyhow::bail!("No files left to upload after the {} filter", mode);
                }
                staging.stage(accepted).await?;
            }
        }

        println!("{} file(s) staged", staging.len());
        for file in staging.files() {
            println!("  {} ({})", file.name, human_size(file.size));
        }
    }

    let transport = Arc::new(HttpTransport::new(config.http_timeout)?);
    let pipeline = UploadPipeline::new(transport, store.clone(), config.clone());

    let mut updates = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let session = updates.borrow().clone();
            match session.status {
                UploadStatus::Uploading => {
                    print!("\r{:>3}%", session.progress_percent);
                    let _ = std::io::stdout().flush();
                }
                UploadStatus::Succeeded => {
                    println!("\rUpload complete");
                    break;
                }
                UploadStatus::Failed => break,
                UploadStatus::Idle => {}
            }
        }
    });

    let result = pipeline.upload(mode).await;

    // Let the settle continuations run so a successful upload clears the
    // store (and with it, the spooled previews) the normal way
    tokio::time::sleep(config.settle_delay + Duration::from_millis(50)).await;
    let _ = printer.await;

    // Whatever the outcome, nothing may stay spooled across process exit
    store.lock().await.clear().await?;

    result?;
    Ok(())
}

fn run_theme(config: &ClientConfig, value: Option<String>) -> anyhow::Result<()> {
    let store = PreferenceStore::new(config.preferences_path.clone());
    match value {
        Some(raw) => {
            let theme: Theme = raw.parse()?;
            store.set_theme(theme).context("Failed to save preferences")?;
            println!("Theme set to {}", theme);
        }
        None => {
            let prefs = store.load().context("Failed to load preferences")?;
            match prefs.theme {
                Some(theme) => println!("{}", theme),
                None => println!("{} (system default)", prefs.initial_theme(false)),
            }
        }
    }
    Ok(())
}

/// Read one file from disk into a picker entry, guessing its content type
/// from the extension.
fn read_picked(path: &Path) -> anyhow::Result<PickedFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    Ok(PickedFile::new(name, content_type, bytes))
}

/// Walk a directory and build picker entries whose relative paths are rooted
/// at the directory's own name, the way a browser folder selection reports
/// them.
fn collect_folder(dir: &Path) -> anyhow::Result<Vec<PickedFile>> {
    let root_name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Cannot determine folder name for {}", dir.display()))?;

    let mut entries = Vec::new();
    visit(dir, Path::new(root_name), &mut entries)?;
    // read_dir order is platform-dependent; sort for a stable archive listing
    entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(entries)
}

fn visit(dir: &Path, prefix: &Path, out: &mut Vec<PickedFile>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let relative = prefix.join(entry.file_name());
        if path.is_dir() {
            visit(&path, &relative, out)?;
        } else {
            let picked = read_picked(&path)?
                .with_relative_path(relative.to_string_lossy().replace('\\', "/"));
            out.push(picked);
        }
    }
    Ok(())
}
