//! Artifact downloading: streaming to disk with partial-file cleanup.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::ProgressBar;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use wheelhouse_util::errors::WheelhouseError;
use wheelhouse_util::progress::download_bar;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bars are only worth drawing for downloads above this size.
const PROGRESS_THRESHOLD: u64 = 100_000;

/// Download raw bytes into memory, with retries on transient failures.
///
/// Used for wheel METADATA extraction during resolution. Returns `Ok(None)`
/// for 404.
pub async fn download_bytes(client: &Client, url: &str) -> miette::Result<Option<Vec<u8>>> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        match client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(WheelhouseError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    }
                    .into());
                }

                let bytes = resp.bytes().await.map_err(|e| WheelhouseError::Network {
                    message: format!("Failed to read response from {url}: {e}"),
                })?;
                return Ok(Some(bytes.to_vec()));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(WheelhouseError::Network {
                    message: format!("Request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(WheelhouseError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    }
    .into())
}

/// Stream an artifact to `dest`, deleting the partial file on any failure.
///
/// Re-downloads of an identical filename are idempotent: artifact identity
/// implies immutable content, so an existing file is left untouched.
/// Returns the number of bytes written (0 when already present).
pub async fn fetch_artifact(
    client: &Client,
    url: &str,
    dest: &Path,
    label: &str,
    show_progress: bool,
) -> miette::Result<u64> {
    if dest.is_file() {
        debug!(path = %dest.display(), "artifact already present, skipping");
        return Ok(0);
    }

    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| WheelhouseError::Network {
            message: format!("Request to {url} failed: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(WheelhouseError::Network {
            message: format!("HTTP {} fetching {url}", resp.status()),
        }
        .into());
    }

    let total = resp.content_length().unwrap_or(0);
    let pb: Option<ProgressBar> = if show_progress && total > PROGRESS_THRESHOLD {
        Some(download_bar(total, label))
    } else {
        None
    };

    match stream_to_file(resp, dest, pb.as_ref()).await {
        Ok(written) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            Ok(written)
        }
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            // Never leave a truncated artifact behind.
            let _ = tokio::fs::remove_file(dest).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    resp: reqwest::Response,
    dest: &Path,
    pb: Option<&ProgressBar>,
) -> miette::Result<u64> {
    let url = resp.url().to_string();
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| WheelhouseError::Io(e))?;

    let mut written = 0u64;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| WheelhouseError::Network {
            message: format!("Failed to read {url}: {e}"),
        })?;
        file.write_all(&chunk)
            .await
            .map_err(WheelhouseError::Io)?;
        written += chunk.len() as u64;
        if let Some(pb) = pb {
            pb.set_position(written);
        }
    }
    file.flush().await.map_err(WheelhouseError::Io)?;
    Ok(written)
}
