use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use vdiforge_verify::{DigestMap, HashAlgorithm, MultiHasher};

use crate::error::{FetchError, Result};
use crate::http::{BoxStream, HttpClient};
use crate::progress::{FetchPhase, Progress, ProgressFn};

/// Outcome of a completed streaming download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub bytes_downloaded: u64,

    /// Lower-hex digest per requested algorithm, computed over exactly the
    /// bytes written to the destination file.
    pub digests: DigestMap,
}

/// Streaming downloader over any [`HttpClient`].
pub struct Fetcher<C: HttpClient> {
    client: C,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Reachability probe; returns Content-Length when the server sends one.
    pub async fn head(&self, url: &str) -> Result<Option<u64>> {
        self.client.head(url).await.map_err(net)
    }

    /// Buffer a small document (manifest, key material) fully in memory.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let mut stream = self.client.stream(url).await.map_err(net)?;
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.map_err(net)?);
        }
        Ok(out)
    }

    /// [`fetch_bytes`](Self::fetch_bytes), decoded as UTF-8.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|_| FetchError::NotText {
            url: url.to_string(),
        })
    }

    /// Stream `url` to `dest`, hashing every chunk under `algorithms` in the
    /// same pass.
    ///
    /// Bytes land in a `.part` staging file that is renamed to `dest` only
    /// after the stream ends cleanly, so a failed download never leaves a
    /// file a later step could mistake for a complete artifact.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        algorithms: &[HashAlgorithm],
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<DownloadReport> {
        let report = |progress: Progress| {
            if let Some(f) = on_progress {
                f(&progress);
            }
        };

        report(Progress {
            phase: FetchPhase::Connecting,
            bytes_downloaded: 0,
            total_bytes: None,
        });
        let total_bytes = self.client.head(url).await.map_err(net)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let staging = staging_path(dest);

        let mut stream = self.client.stream(url).await.map_err(net)?;
        let mut file = fs::File::create(&staging).await?;
        let mut hasher = MultiHasher::new(algorithms.iter().copied());

        tracing::debug!(url, staging = %staging.display(), "download started");
        report(Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded: 0,
            total_bytes,
        });

        let copied = copy_chunks(&mut stream, &mut file, &mut hasher, total_bytes, &report).await;
        let bytes_downloaded = match copied {
            Ok(n) => n,
            Err(err) => {
                drop(file);
                let _ = fs::remove_file(&staging).await;
                return Err(err);
            }
        };

        report(Progress {
            phase: FetchPhase::Committing,
            bytes_downloaded,
            total_bytes,
        });
        if let Err(err) = fs::rename(&staging, dest).await {
            let _ = fs::remove_file(&staging).await;
            return Err(err.into());
        }

        report(Progress {
            phase: FetchPhase::Completed,
            bytes_downloaded,
            total_bytes,
        });
        tracing::debug!(url, bytes = bytes_downloaded, "download complete");

        Ok(DownloadReport {
            bytes_downloaded,
            digests: hasher.finalize(),
        })
    }
}

/// Per-chunk fan-out: hash, persist, report, in that order, before the next
/// chunk is pulled off the stream.
async fn copy_chunks<E: std::error::Error>(
    stream: &mut BoxStream<'static, std::result::Result<bytes::Bytes, E>>,
    file: &mut fs::File,
    hasher: &mut MultiHasher,
    total_bytes: Option<u64>,
    report: &impl Fn(Progress),
) -> Result<u64> {
    let mut bytes_downloaded = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(net)?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        bytes_downloaded += chunk.len() as u64;
        report(Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded,
            total_bytes,
        });
    }
    file.flush().await?;
    Ok(bytes_downloaded)
}

fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("download");
    dest.with_file_name(format!("{name}.part"))
}

fn net<E: std::error::Error>(err: E) -> FetchError {
    FetchError::Network(err.to_string())
}
