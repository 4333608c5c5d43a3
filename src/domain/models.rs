use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the four bipolar rating dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trait {
    Humble,
    Considerate,
    Kind,
    Smart,
}

impl Trait {
    pub const ALL: [Trait; 4] = [Trait::Humble, Trait::Considerate, Trait::Kind, Trait::Smart];

    /// Field name used in stored records
    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Humble => "humble",
            Trait::Considerate => "considerate",
            Trait::Kind => "kind",
            Trait::Smart => "smart",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trait::Humble => "Humility",
            Trait::Considerate => "Consideration",
            Trait::Kind => "Kindness",
            Trait::Smart => "Intelligence",
        }
    }

    /// Slider ends, low end first
    pub fn poles(&self) -> (&'static str, &'static str) {
        match self {
            Trait::Humble => ("Humble", "Narcissist"),
            Trait::Considerate => ("Considerate", "Bully"),
            Trait::Kind => ("Kind", "Bad"),
            Trait::Smart => ("Smart", "Stupid"),
        }
    }
}

/// Four trait values, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRatings {
    pub humble: u8,
    pub considerate: u8,
    pub kind: u8,
    pub smart: u8,
}

/// The averaged rating across all valid submissions
pub type AggregateRating = TraitRatings;

impl TraitRatings {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;
    pub const NEUTRAL: u8 = 50;

    pub fn new(humble: u8, considerate: u8, kind: u8, smart: u8) -> Self {
        Self {
            humble: humble.min(Self::MAX),
            considerate: considerate.min(Self::MAX),
            kind: kind.min(Self::MAX),
            smart: smart.min(Self::MAX),
        }
    }

    /// Slider starting position and the fallback general rating
    pub fn neutral() -> Self {
        Self::new(Self::NEUTRAL, Self::NEUTRAL, Self::NEUTRAL, Self::NEUTRAL)
    }

    /// All four values within [0, 100]
    pub fn is_in_scale(&self) -> bool {
        self.iter().all(|(_, v)| v <= Self::MAX)
    }

    pub fn get(&self, field: Trait) -> u8 {
        match field {
            Trait::Humble => self.humble,
            Trait::Considerate => self.considerate,
            Trait::Kind => self.kind,
            Trait::Smart => self.smart,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, u8)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self.get(t)))
    }
}

/// A rating as appended to the remote collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    #[serde(flatten)]
    pub ratings: TraitRatings,
    /// Creation time, Unix epoch milliseconds
    pub timestamp: i64,
    /// Opaque submitter fingerprint
    pub device_id: String,
}

impl RatingRecord {
    pub fn new(ratings: TraitRatings, timestamp: i64, device_id: impl Into<String>) -> Self {
        Self {
            ratings,
            timestamp,
            device_id: device_id.into(),
        }
    }
}

/// An untrusted record as returned by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl RawRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&RatingRecord> for RawRecord {
    fn from(record: &RatingRecord) -> Self {
        Self(serde_json::to_value(record).unwrap_or(Value::Null))
    }
}
