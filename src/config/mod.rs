pub mod settings;

pub use settings::{APP_VERSION, AppConfig, CacheSettings, RemoteSettings, StoreSettings, VoteSettings};
