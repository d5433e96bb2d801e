//! Package sources.
//!
//! Fetching remote files and turning the source archive into a build
//! directory.

pub mod archive;
pub mod fetch;

pub use fetch::{Fetcher, HttpFetcher};
