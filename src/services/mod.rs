pub mod cancel;
pub mod clock;
pub mod controller;

pub use cancel::CancelSignal;
pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    AggregationController, ControllerSettings, ErrorBanner, ErrorKind, GeneralRating, Phase, RefreshOutcome,
    ViewSnapshot,
};
