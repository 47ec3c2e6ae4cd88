use bytes::Bytes;
use localshare_core::models::PickedFile;
use localshare_core::AppError;
use std::io::Write;
use std::path::{Component, Path};

/// Validate and normalize an entry's relative path for the archive.
/// Keeps the directory structure; rejects empty, absolute, and traversal
/// paths.
fn sanitize_entry_path(path: &str) -> Result<String, AppError> {
    let trimmed = path.trim_start_matches('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    AppError::InvalidInput(format!("Path is not valid UTF-8: {}", path))
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "Path escapes the selected folder: {}",
                    path
                )))
            }
        }
    }

    if parts.is_empty() {
        return Err(AppError::InvalidInput(format!("Unusable path: {:?}", path)));
    }

    Ok(parts.join("/"))
}

/// Pack a folder selection into a single zip archive.
///
/// Every entry keeps its relative path inside the archive, in input order,
/// so the logical file listing is deterministic for a given selection. The
/// archive is named after the top-level directory component of the first
/// entry's path, and is returned as a synthetic `PickedFile` that stages
/// like any single file. Compression runs on a blocking thread.
pub async fn archive_folder(entries: Vec<PickedFile>) -> Result<PickedFile, AppError> {
    if entries.is_empty() {
        return Err(AppError::InvalidInput(
            "Folder selection is empty".to_string(),
        ));
    }

    // Validate every path up front so errors surface before compressing
    let mut items: Vec<(String, Bytes)> = Vec::with_capacity(entries.len());
    for entry in &entries {
        let relative = entry.relative_path.as_deref().ok_or_else(|| {
            AppError::InvalidInput(format!("File {} has no relative path", entry.name))
        })?;
        items.push((sanitize_entry_path(relative)?, entry.bytes.clone()));
    }

    let root = items[0]
        .0
        .split('/')
        .next()
        .unwrap_or("archive")
        .to_string();
    let archive_name = format!("{}.zip", root);

    let entry_count = items.len();
    let start = std::time::Instant::now();

    let buffer = tokio::task::spawn_blocking(move || write_zip(items))
        .await
        .map_err(|e| AppError::Internal(format!("Archive task failed: {}", e)))??;

    tracing::info!(
        archive = %archive_name,
        entries = entry_count,
        size_bytes = buffer.len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Folder archived"
    );

    Ok(PickedFile::new(archive_name, "application/zip", buffer))
}

fn write_zip(items: Vec<(String, Bytes)>) -> Result<Vec<u8>, AppError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (path, data) in &items {
            zip.start_file(path.as_str(), options)
                .map_err(|e| AppError::Internal(format!("Failed to add {} to archive: {}", path, e)))?;
            zip.write_all(data)
                .map_err(|e| AppError::Internal(format!("Failed to write {} to archive: {}", path, e)))?;
        }

        zip.finish()
            .map_err(|e| AppError::Internal(format!("Failed to finalize archive: {}", e)))?;
    }

    Ok(buffer)
}
