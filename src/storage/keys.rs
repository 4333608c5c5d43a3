/// Every key this client writes to its local store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Last computed general rating and when it was computed
    GeneralRatings,
    /// Whether this device voted and what it submitted
    VoteState,
    /// App version that last initialized the store
    AppVersion,
}

impl StorageKey {
    /// Keys whose contents derive from a given app version
    pub const DERIVED: [StorageKey; 2] = [StorageKey::GeneralRatings, StorageKey::VoteState];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::GeneralRatings => "generalRatings",
            StorageKey::VoteState => "voteState",
            StorageKey::AppVersion => "appVersion",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
