// Whisper Engine - Model Downloading
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use reqwest::Client;
use serde::Deserialize;
use anyhow::{Result, anyhow, Context};

use super::model_registry::{
    coreml_api_url, coreml_download_url, coreml_model_path, format_bytes, model_path,
    COREML_MODEL_NAME, WHISPER_MODEL,
};

/// Progress snapshot passed to download callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: u64,
    pub percent: u8,
}

impl DownloadProgress {
    pub fn new(downloaded: u64, total: u64) -> Self {
        let percent = if total > 0 {
            ((downloaded as f64 / total as f64) * 100.0).min(100.0) as u8
        } else {
            0
        };
        Self { downloaded, total, percent }
    }
}

pub type ProgressCallback = Box<dyn Fn(DownloadProgress) + Send + Sync>;

#[derive(Default)]
pub struct DownloadOptions {
    /// Target directory, defaults to [`default_model_dir`](super::model_registry::default_model_dir)
    pub model_dir: Option<PathBuf>,
    /// Download again even if the file exists
    pub force: bool,
    pub on_progress: Option<ProgressCallback>,
}

/// Entry of the Hugging Face tree API
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Download the ggml model from Hugging Face and return its path
pub async fn download_model(options: &DownloadOptions) -> Result<PathBuf> {
    let file_path = model_path(options.model_dir.as_deref());

    if !options.force && file_path.exists() {
        log::info!("Model already present at {}", file_path.display());
        return Ok(file_path);
    }

    if file_path.exists() {
        fs::remove_file(&file_path).await
            .with_context(|| format!("Failed to remove existing model {}", file_path.display()))?;
    }

    log::info!("Downloading Whisper {} ({}) from {}", WHISPER_MODEL.name, WHISPER_MODEL.size, WHISPER_MODEL.url);
    log::info!("Downloading to file path: {}", file_path.display());

    let client = Client::new();
    let partial_path = file_path.with_extension("bin.part");

    match stream_to_file(&client, WHISPER_MODEL.url, &partial_path, options.on_progress.as_ref()).await {
        Ok(downloaded) => {
            fs::rename(&partial_path, &file_path).await
                .with_context(|| format!("Failed to move download into place at {}", file_path.display()))?;
            log::info!("Download completed: {} ({})", file_path.display(), format_bytes(downloaded));
            Ok(file_path)
        }
        Err(e) => {
            if let Err(cleanup_err) = fs::remove_file(&partial_path).await {
                log::debug!("No partial download to clean up: {}", cleanup_err);
            }
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &Client,
    url: &str,
    destination: &Path,
    on_progress: Option<&ProgressCallback>,
) -> Result<u64> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await
            .map_err(|e| anyhow!("Failed to create models directory: {}", e))?;
    }

    let response = client.get(url).send().await
        .map_err(|e| anyhow!("Failed to start download: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!("Download failed with status: {}", response.status()));
    }

    let total_size = response.content_length().unwrap_or(0);
    let mut file = fs::File::create(destination).await
        .map_err(|e| anyhow!("Failed to create file: {}", e))?;

    use futures_util::StreamExt;
    let mut stream = response.bytes_stream();
    let mut downloaded = 0u64;
    let mut last_percent = 0u8;

    if let Some(callback) = on_progress {
        callback(DownloadProgress::new(0, total_size));
    }

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result
            .map_err(|e| anyhow!("Failed to read chunk: {}", e))?;

        file.write_all(&chunk).await
            .map_err(|e| anyhow!("Failed to write chunk to file: {}", e))?;

        downloaded += chunk.len() as u64;

        let progress = DownloadProgress::new(downloaded, total_size);
        if progress.percent > last_percent {
            log::debug!("Download progress: {}% ({} / {})",
                       progress.percent, format_bytes(downloaded), format_bytes(total_size));
            last_percent = progress.percent;
        }

        if let Some(callback) = on_progress {
            callback(progress);
        }
    }

    file.flush().await
        .map_err(|e| anyhow!("Failed to flush file: {}", e))?;

    Ok(downloaded)
}

async fn fetch_tree(client: &Client, path: &str) -> Result<Vec<TreeEntry>> {
    let url = format!("{}/tree/main/{}", coreml_api_url(), path);
    let response = client.get(&url).send().await
        .map_err(|e| anyhow!("Failed to fetch file tree: {}", e))?;

    if !response.status().is_success() {
        return Err(anyhow!("Failed to fetch file tree: {}", response.status()));
    }

    response.json::<Vec<TreeEntry>>().await
        .map_err(|e| anyhow!("Invalid file tree response: {}", e))
}

/// Walk the tree API depth-first and collect every file below `root`
async fn list_files(client: &Client, root: &str) -> Result<Vec<TreeEntry>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_string()];

    while let Some(dir) = pending.pop() {
        for entry in fetch_tree(client, &dir).await? {
            if entry.is_file() {
                files.push(entry);
            } else {
                pending.push(entry.path);
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Download the CoreML encoder bundle file by file and return its path
pub async fn download_coreml_model(options: &DownloadOptions) -> Result<PathBuf> {
    let model_dir = options.model_dir.clone().unwrap_or_else(super::model_registry::default_model_dir);
    let coreml_path = coreml_model_path(Some(&model_dir));

    if !options.force && coreml_path.exists() {
        log::info!("CoreML encoder already present at {}", coreml_path.display());
        return Ok(coreml_path);
    }

    if coreml_path.exists() {
        fs::remove_dir_all(&coreml_path).await
            .with_context(|| format!("Failed to remove existing encoder {}", coreml_path.display()))?;
    }

    let client = Client::new();
    log::info!("Fetching CoreML model file list from Hugging Face...");
    let files = list_files(&client, COREML_MODEL_NAME).await?;

    let total_size: u64 = files.iter().filter_map(|f| f.size).sum();
    log::info!("Downloading CoreML encoder ({} files, {})", files.len(), format_bytes(total_size));

    // Progress is reported per file, in bytes of the bundle as a whole
    let mut downloaded = 0u64;
    for file in &files {
        let url = format!("{}/{}", coreml_download_url(), file.path);
        downloaded += stream_to_file(&client, &url, &model_dir.join(&file.path), None).await
            .with_context(|| format!("Failed to download {}", file.path))?;

        if let Some(callback) = &options.on_progress {
            callback(DownloadProgress::new(downloaded, total_size.max(downloaded)));
        }
    }

    log::info!("CoreML encoder downloaded to {}", coreml_path.display());
    Ok(coreml_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_download_progress_percent() {
        assert_eq!(DownloadProgress::new(0, 0).percent, 0);
        assert_eq!(DownloadProgress::new(50, 200).percent, 25);
        assert_eq!(DownloadProgress::new(200, 200).percent, 100);
        // Servers occasionally under-report content length
        assert_eq!(DownloadProgress::new(300, 200).percent, 100);
    }

    #[test]
    fn test_tree_entry_parsing() {
        let entries: Vec<TreeEntry> = serde_json::from_str(
            r#"[
                {"type": "directory", "path": "ggml-large-v3-turbo-encoder.mlmodelc/weights", "oid": "abc"},
                {"type": "file", "path": "ggml-large-v3-turbo-encoder.mlmodelc/model.mil", "size": 1024}
            ]"#,
        )
        .unwrap();

        assert!(!entries[0].is_file());
        assert!(entries[1].is_file());
        assert_eq!(entries[1].size, Some(1024));
    }

    #[tokio::test]
    async fn test_download_skips_existing_model() {
        let dir = tempdir().unwrap();
        let existing = model_path(Some(dir.path()));
        std::fs::write(&existing, b"ggml").unwrap();

        let options = DownloadOptions {
            model_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let path = download_model(&options).await.unwrap();
        assert_eq!(path, existing);
        assert_eq!(std::fs::read(&path).unwrap(), b"ggml");
    }

    #[tokio::test]
    async fn test_coreml_download_skips_existing_bundle() {
        let dir = tempdir().unwrap();
        let existing = coreml_model_path(Some(dir.path()));
        std::fs::create_dir_all(&existing).unwrap();

        let options = DownloadOptions {
            model_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(download_coreml_model(&options).await.unwrap(), existing);
    }
}
