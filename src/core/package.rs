//! Package descriptor for the pinned HPDDM revision.
//!
//! The descriptor is built once at startup and never mutated. The only
//! runtime choice is where the source archive comes from, see
//! [`DownloadSource`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

/// Pinned upstream revision.
pub const HPDDM_VERSION: &str = "d0c29caba379288f6780699e4bd58df6b7d44264";

/// Static description of an external package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    /// Lower-case package name (e.g. `hpddm`)
    pub name: String,
    /// Pinned version identifier
    pub version: String,
    /// Download URL of the source archive
    pub url: String,
    /// File name the archive is stored under
    pub archive: String,
    /// Top-level directory inside the archive
    pub dirname: String,
    /// Name of the shared library produced (without `lib` and suffix)
    pub library: String,
    /// Whether single precision scalars are supported
    pub supports_single: bool,
    /// Whether `__float128` scalars are supported
    pub supports_quad: bool,
    /// Whether 64-bit indices are supported
    pub supports_64bit_indices: bool,
}

impl PackageDescriptor {
    /// The HPDDM package at its pinned revision.
    pub fn hpddm() -> Self {
        PackageDescriptor {
            name: "hpddm".to_string(),
            version: HPDDM_VERSION.to_string(),
            url: format!("https://github.com/hpddm/hpddm/archive/{}.tar.gz", HPDDM_VERSION),
            archive: format!("{}.tar.gz", HPDDM_VERSION),
            dirname: format!("hpddm-{}", HPDDM_VERSION),
            library: "hpddm_petsc".to_string(),
            supports_single: true,
            supports_quad: false,
            supports_64bit_indices: true,
        }
    }

    /// Upper-case name used in macros and make variables.
    pub fn macro_name(&self) -> String {
        self.name.to_uppercase()
    }

    /// Short version for display (first 8 characters of the revision).
    pub fn short_version(&self) -> &str {
        let end = self.version.len().min(8);
        &self.version[..end]
    }
}

/// Where the source archive is taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DownloadSource {
    /// The descriptor's pinned URL
    #[default]
    Pinned,
    /// An alternative URL
    Url(String),
    /// An archive already on disk
    LocalArchive(PathBuf),
}

impl DownloadSource {
    /// File name a downloaded archive is kept under in the external packages
    /// directory, if this source needs the network.
    ///
    /// Archives from an explicit URL are named after the URL and prefixed with
    /// the package name, so they never share a file with the pinned archive.
    pub fn archive_name(&self, package: &PackageDescriptor) -> Option<String> {
        match self {
            DownloadSource::Pinned => Some(package.archive.clone()),
            DownloadSource::Url(url) => {
                let file = Url::parse(url)
                    .ok()
                    .and_then(|parsed| {
                        parsed
                            .path_segments()
                            .and_then(|segments| segments.last())
                            .filter(|segment| !segment.is_empty())
                            .map(str::to_string)
                    })
                    .unwrap_or_else(|| "download.tar.gz".to_string());
                Some(format!("{}-{}", package.name, file))
            }
            DownloadSource::LocalArchive(_) => None,
        }
    }
}

impl FromStr for DownloadSource {
    type Err = std::convert::Infallible;

    /// Anything that parses as an absolute URL with a scheme other than
    /// `file` is downloaded; everything else is treated as a local archive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Url::parse(s) {
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Ok(DownloadSource::LocalArchive(path)),
                Err(()) => Ok(DownloadSource::LocalArchive(PathBuf::from(s))),
            },
            // Windows drive letters parse as single-letter schemes
            Ok(url) if url.scheme().len() > 1 => Ok(DownloadSource::Url(s.to_string())),
            _ => Ok(DownloadSource::LocalArchive(PathBuf::from(s))),
        }
    }
}

impl fmt::Display for DownloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadSource::Pinned => write!(f, "pinned"),
            DownloadSource::Url(url) => write!(f, "{}", url),
            DownloadSource::LocalArchive(path) => write!(f, "{}", path.display()),
        }
    }
}
