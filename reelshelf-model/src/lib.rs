//! Core data model definitions shared across Reelshelf crates.
#![allow(missing_docs)]

pub mod collection;
pub mod error;
pub mod ids;
pub mod media;
pub mod media_type;
pub mod prelude;
pub mod query;

// Intentionally curated re-exports for downstream consumers.
pub use collection::{ApiCollection, Collection, CollectionPatch};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{CollectionId, MediaId};
pub use media::MediaItem;
pub use media_type::MediaType;
pub use query::{MediaQuery, ScalarRange};
