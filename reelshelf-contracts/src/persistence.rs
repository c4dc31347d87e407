use std::fmt::Debug;

use async_trait::async_trait;
use reelshelf_model::{ApiCollection, CollectionId, CollectionPatch, MediaId};

use crate::error::ApiResult;

/// Durable backing store for the user's collections.
///
/// Collections travel in their wire shape ([`ApiCollection`]): identifiers
/// only. The store hydrates them with records from a
/// [`MediaDirectory`](crate::MediaDirectory).
#[async_trait]
pub trait CollectionPersistence: Send + Sync + Debug {
    /// Fetch every collection owned by the current user
    async fn list_collections(&self) -> ApiResult<Vec<ApiCollection>>;

    /// Create an empty collection; the service assigns the identifier
    async fn create_collection(&self, name: &str) -> ApiResult<ApiCollection>;

    /// Apply a partial update and return the stored collection
    async fn update_collection(
        &self,
        id: &CollectionId,
        patch: &CollectionPatch,
    ) -> ApiResult<ApiCollection>;

    async fn delete_collection(&self, id: &CollectionId) -> ApiResult<()>;

    /// Append a media item. Returns the service's success flag.
    async fn add_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<bool>;

    async fn remove_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<()>;

    /// Replace the stored order with `media_ids` (the full sequence, not a
    /// delta). Returns the service's success flag.
    async fn reorder_items(
        &self,
        collection_id: &CollectionId,
        media_ids: &[MediaId],
    ) -> ApiResult<bool>;
}
