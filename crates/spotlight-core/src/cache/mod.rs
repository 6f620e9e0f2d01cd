//! Cached collection loading.
//!
//! This module provides the `DataLoader`, which serves the artists and
//! events collections from the preference store while they are fresh and
//! fetches, normalizes and re-caches them otherwise.
//!
//! Freshness windows:
//! - Artists: 15 minutes
//! - Events: 10 minutes

pub mod loader;

pub use loader::{DataLoader, LoadSource, Loaded};
