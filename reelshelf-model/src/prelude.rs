//! Snapshot of the types surface used by the store and the API client.
//! Prefer importing from this module instead of individual tree nodes.

pub use super::collection::{ApiCollection, Collection, CollectionPatch};
pub use super::error::ModelError;
pub use super::ids::{CollectionId, MediaId};
pub use super::media::MediaItem;
pub use super::media_type::MediaType;
pub use super::query::{MediaQuery, ScalarRange};
