use std::fmt::Debug;

use async_trait::async_trait;
use reelshelf_model::MediaId;

use crate::error::ApiResult;

/// Per-user record of watched titles
#[async_trait]
pub trait WatchHistory: Send + Sync + Debug {
    async fn list_watched(&self) -> ApiResult<Vec<MediaId>>;

    async fn mark_watched(&self, media_id: &MediaId) -> ApiResult<bool>;

    async fn unmark_watched(&self, media_id: &MediaId) -> ApiResult<bool>;
}
