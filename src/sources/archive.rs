//! Acquiring and unpacking the package's source archive.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::TempDir;

use crate::core::package::{DownloadSource, PackageDescriptor};
use crate::core::plan::InstallPlan;
use crate::error::{InstallError, InstallResult};
use crate::sources::fetch::Fetcher;
use crate::util::fs::ensure_dir;

/// How the sources ended up in the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquired {
    /// The build directory was already populated
    Existing,
    /// An archive already on disk was unpacked
    Unpacked(PathBuf),
    /// The archive was downloaded and unpacked
    Downloaded(PathBuf),
}

/// Make the package sources available in `plan.build_dir`.
///
/// Nothing is downloaded if the build directory is already populated. The
/// pinned archive is downloaded once and reused afterwards; an explicit URL is
/// fetched on every call into its own file.
pub fn acquire(
    package: &PackageDescriptor,
    plan: &InstallPlan,
    source: &DownloadSource,
    fetcher: &mut dyn Fetcher,
) -> InstallResult<Acquired> {
    if is_populated(&plan.build_dir) {
        tracing::info!("Using {}", plan.build_dir.display());
        return Ok(Acquired::Existing);
    }

    let (archive, downloaded) = match source {
        DownloadSource::LocalArchive(path) => {
            if !path.is_file() {
                return Err(InstallError::download(
                    &package.name,
                    anyhow::anyhow!("archive not found: {}", path.display()),
                ));
            }
            (path.clone(), false)
        }
        DownloadSource::Pinned => {
            let dest = plan.archive_path(package);
            if dest.is_file() {
                tracing::info!("Using archive {}", dest.display());
                (dest, false)
            } else {
                download(&package.url, &dest, fetcher)?;
                (dest, true)
            }
        }
        DownloadSource::Url(url) => {
            let name = source
                .archive_name(package)
                .unwrap_or_else(|| format!("{}-download.tar.gz", package.name));
            let dest = plan.extern_dir.join(name);
            download(url, &dest, fetcher)?;
            (dest, true)
        }
    };

    tracing::info!("Unpacking {}", archive.display());
    unpack(&archive, &plan.extern_dir, &plan.build_dir)
        .map_err(|e| InstallError::download(archive.display().to_string(), e))?;

    Ok(if downloaded {
        Acquired::Downloaded(archive)
    } else {
        Acquired::Unpacked(archive)
    })
}

fn download(url: &str, dest: &Path, fetcher: &mut dyn Fetcher) -> InstallResult<()> {
    tracing::info!("Downloading {}", url);
    fetcher
        .fetch(url, dest)
        .map_err(|e| InstallError::download(url, e))
}

fn is_populated(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Unpack `archive` into `build_dir`, stripping its single top-level directory.
///
/// Extraction happens in a scratch directory under `scratch_parent` that is
/// renamed into place at the end, so a failed unpack never leaves a
/// half-populated build directory behind.
fn unpack(archive: &Path, scratch_parent: &Path, build_dir: &Path) -> Result<()> {
    ensure_dir(scratch_parent)?;

    let prefix = top_level_dir(open_gz(archive)?)?;
    let scratch = TempDir::new_in(scratch_parent).with_context(|| {
        format!(
            "failed to create scratch directory in {}",
            scratch_parent.display()
        )
    })?;
    extract_tarball(open_gz(archive)?, scratch.path(), prefix.as_deref())?;

    if build_dir.exists() {
        fs::remove_dir_all(build_dir)
            .with_context(|| format!("failed to remove {}", build_dir.display()))?;
    }
    fs::rename(scratch.path(), build_dir).with_context(|| {
        format!(
            "failed to move {} to {}",
            scratch.path().display(),
            build_dir.display()
        )
    })?;
    Ok(())
}

fn open_gz(path: &Path) -> Result<GzDecoder<File>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(GzDecoder::new(file))
}

/// The directory every entry of the archive lives under, if there is one.
pub fn top_level_dir<R: Read>(reader: R) -> Result<Option<String>> {
    let mut archive = Archive::new(reader);
    let mut prefix: Option<String> = None;

    for entry in archive.entries().context("failed to read tarball entries")? {
        let entry = entry.context("failed to read tarball entry")?;
        let path = entry.path().context("failed to get entry path")?;

        // GitHub archives carry a pax global header with the commit id
        if entry.header().entry_type() == tar::EntryType::XGlobalHeader {
            continue;
        }

        let first = match path.components().next() {
            Some(Component::Normal(c)) => c.to_string_lossy().into_owned(),
            _ => return Ok(None),
        };
        match &prefix {
            None => prefix = Some(first),
            Some(p) if *p == first => {}
            Some(_) => return Ok(None),
        }
    }

    Ok(prefix)
}

/// Extract a gzip-decoded tarball stream to a destination directory.
///
/// If `strip_prefix` is provided, it is stripped from all entry paths.
pub fn extract_tarball<R: Read>(reader: R, dest: &Path, strip_prefix: Option<&str>) -> Result<()> {
    let mut archive = Archive::new(reader);

    ensure_dir(dest)?;

    for entry in archive.entries().context("failed to read tarball entries")? {
        let mut entry = entry.context("failed to read tarball entry")?;
        let entry_path = entry.path().context("failed to get entry path")?.into_owned();

        let relative = match strip_prefix {
            Some(prefix) => match entry_path.strip_prefix(prefix) {
                Ok(rest) => rest.to_path_buf(),
                Err(_) => entry_path.clone(),
            },
            None => entry_path.clone(),
        };

        if relative.as_os_str().is_empty() {
            continue;
        }

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            bail!(
                "tarball entry escapes destination directory: {}",
                entry_path.display()
            );
        }

        let output_path = dest.join(&relative);
        if let Some(parent) = output_path.parent() {
            ensure_dir(parent)?;
        }

        let entry_type = entry.header().entry_type();
        match entry_type {
            tar::EntryType::Directory => ensure_dir(&output_path)?,
            tar::EntryType::Regular
            | tar::EntryType::Continuous
            | tar::EntryType::Link
            | tar::EntryType::Symlink => {
                entry.unpack(&output_path).with_context(|| {
                    format!("failed to extract file: {}", output_path.display())
                })?;
            }
            _ => {
                tracing::debug!(
                    "Skipping unsupported entry type {:?}: {}",
                    entry_type,
                    entry_path.display()
                );
            }
        }
    }

    Ok(())
}
