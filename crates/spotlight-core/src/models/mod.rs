//! Data models for directory records.
//!
//! This module contains the data structures used to represent the
//! directory's collections:
//!
//! - `Artist`, `RawArtist`, `Experience`: artist profiles and their source form
//! - `Event`, `RawEvent`, `EventStatus`: calendar events with derived time flags
//! - `ResourceKind`, `Resource`: the per-collection behaviour the loader relies on

pub mod artist;
pub mod event;
mod lenient;
pub mod resource;

pub use artist::{Artist, Experience, RawArtist};
pub use event::{group_by_status, Event, EventGroups, EventStatus, RawEvent};
pub use resource::{decode_collection, normalize_all, Resource, ResourceKind};
