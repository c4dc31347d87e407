//! Trait surfaces for the remote services the Reelshelf client talks to.
//!
//! The collection store only ever sees these traits. The HTTP client crate
//! implements them against the REST API, and `reelshelf-core` ships
//! in-memory fakes for tests.

pub mod directory;
pub mod error;
pub mod persistence;
pub mod watch_history;

pub use directory::MediaDirectory;
pub use error::{ApiError, ApiResult};
pub use persistence::CollectionPersistence;
pub use watch_history::WatchHistory;

/// Frequently used contract imports for store and client crates.
pub mod prelude {
    pub use super::directory::MediaDirectory;
    pub use super::error::{ApiError, ApiResult};
    pub use super::persistence::CollectionPersistence;
    pub use super::watch_history::WatchHistory;
}
