pub mod ledger;

pub use ledger::{VoteLedger, VoteState};
