pub mod config;
pub mod error;
pub mod source;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use source::QuoteSource;
pub use store::TickStore;
pub use types::*;

/// Current local clock in whole seconds since epoch.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
