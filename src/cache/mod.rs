pub mod structs;

pub use structs::{CacheEntry, FRESHNESS_WINDOW_MS, RatingCache};
