pub mod models;

pub use models::{AggregateRating, RatingRecord, RawRecord, Trait, TraitRatings};
