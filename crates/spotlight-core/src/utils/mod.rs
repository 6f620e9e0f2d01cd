//! Utility functions for string formatting and timestamp handling.

pub mod format;
pub mod time;

// Re-export commonly used functions at module level
pub use format::{
    category_label, cmp_ignore_case, contains_ignore_case, slugify, star_rating, title_case,
    truncate_string,
};
pub use time::{epoch_millis, parse_timestamp};
