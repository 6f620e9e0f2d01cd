//! Collection sources and load errors.
//!
//! The directory's data lives in two static JSON documents,
//! `artists.json` and `events.json`. A `Fetcher` retrieves the raw body
//! of either one; HTTP, local-directory and in-memory fetchers are
//! provided.

pub mod client;
pub mod error;

pub use client::{DirectoryFetcher, Fetcher, HttpFetcher, MemoryFetcher, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{DataLoadError, FetchError};
