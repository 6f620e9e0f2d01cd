//! Declarative filtering and ordering of normalized collections.
//!
//! Criteria are plain values: every set field narrows the result and unset
//! fields match everything. `apply` never touches its input, and running it
//! twice with the same criteria gives the same result as running it once.

pub mod criteria;
pub mod engine;

pub use criteria::{
    ArtistCriteria, ArtistSort, EventCriteria, EventSort, ParseCriteriaError, PriceFilter, Timeframe,
};
pub use engine::{apply, Criteria};
