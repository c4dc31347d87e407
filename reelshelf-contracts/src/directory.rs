use std::fmt::Debug;

use async_trait::async_trait;
use reelshelf_model::{MediaId, MediaItem, MediaQuery};

use crate::error::ApiResult;

/// Catalog service resolving media identifiers to full records.
#[async_trait]
pub trait MediaDirectory: Send + Sync + Debug {
    async fn get_by_id(&self, id: &MediaId) -> ApiResult<MediaItem>;

    /// Resolve many identifiers in one call.
    ///
    /// Implementations must return `Ok(vec![])` for an empty input without
    /// touching the network. Identifiers the catalog does not know are
    /// simply absent from the result.
    async fn get_by_ids(&self, ids: &[MediaId]) -> ApiResult<Vec<MediaItem>>;

    /// Catalog search with filters
    async fn search(&self, query: &MediaQuery) -> ApiResult<Vec<MediaItem>>;

    async fn popular(&self) -> ApiResult<Vec<MediaItem>>;

    async fn new_releases(&self) -> ApiResult<Vec<MediaItem>>;
}
