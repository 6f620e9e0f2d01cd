//! Artist Spotlight core library.
//!
//! Loads the artists and events collections from static JSON documents,
//! keeps a time-boxed copy in a preference store, normalizes records once,
//! and filters, sorts and counts them for presentation.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod facets;
pub mod filter;
pub mod models;
pub mod prefs;
pub mod utils;

pub use app::{App, CalendarEntry, RecentlyViewed};
pub use config::Config;
