use log::debug;

use super::normalization::normalize_record;
use crate::domain::{AggregateRating, RawRecord, TraitRatings};

/// Running sums over accepted records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    humble: u64,
    considerate: u64,
    kind: u64,
    smart: u64,
    count: u64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ratings: &TraitRatings) {
        self.humble += u64::from(ratings.humble);
        self.considerate += u64::from(ratings.considerate);
        self.kind += u64::from(ratings.kind);
        self.smart += u64::from(ratings.smart);
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Rounded mean of every field, or `None` when nothing was added
    pub fn mean(&self) -> Option<AggregateRating> {
        if self.count == 0 {
            return None;
        }

        Some(TraitRatings {
            humble: rounded_mean(self.humble, self.count),
            considerate: rounded_mean(self.considerate, self.count),
            kind: rounded_mean(self.kind, self.count),
            smart: rounded_mean(self.smart, self.count),
        })
    }
}

/// Outcome of one aggregation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationReport {
    pub aggregate: Option<AggregateRating>,
    pub accepted: u64,
    pub rejected: u64,
}

/// Average all valid records. Records with any invalid field are skipped whole.
pub fn aggregate<'a, I>(records: I) -> Option<AggregateRating>
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    aggregate_with_report(records).aggregate
}

pub fn aggregate_with_report<'a, I>(records: I) -> AggregationReport
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut acc = Accumulator::new();
    let mut rejected = 0;

    for record in records {
        match normalize_record(record) {
            Ok(ratings) => acc.add(&ratings),
            Err(e) => {
                debug!("Skipping rating record: {}", e);
                rejected += 1;
            }
        }
    }

    AggregationReport {
        aggregate: acc.mean(),
        accepted: acc.count(),
        rejected,
    }
}

/// round(sum / count) with halves rounded away from zero.
/// Every field is at most 100, so the result fits in a u8.
fn rounded_mean(sum: u64, count: u64) -> u8 {
    let value = (2 * sum + count) / (2 * count);
    value.min(u64::from(TraitRatings::MAX)) as u8
}
