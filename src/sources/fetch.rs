//! Fetching remote files.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;

use crate::util::fs::ensure_dir;

/// Downloads a URL to a file.
pub trait Fetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetcher backed by a blocking HTTP client.
///
/// The body is written to a temporary file next to `dest` and renamed into
/// place once complete, so an interrupted download never leaves a truncated
/// file at `dest`.
#[derive(Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&mut self, url: &str, dest: &Path) -> Result<()> {
        tracing::info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("failed to download {}: HTTP {}", url, response.status());
        }

        let dir = dest.parent().unwrap_or(Path::new("."));
        ensure_dir(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        let bytes = response
            .copy_to(&mut tmp)
            .with_context(|| format!("failed to read response body from {}", url))?;
        tmp.flush()?;
        tmp.persist(dest)
            .with_context(|| format!("failed to write {}", dest.display()))?;

        tracing::debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}
