use async_trait::async_trait;
use reelshelf_contracts::{ApiResult, WatchHistory};
use reelshelf_model::MediaId;

use crate::ApiClient;
use crate::routes::{utils, watched};

#[async_trait]
impl WatchHistory for ApiClient {
    async fn list_watched(&self) -> ApiResult<Vec<MediaId>> {
        self.get(watched::LIST).await
    }

    async fn mark_watched(&self, media_id: &MediaId) -> ApiResult<bool> {
        let path = utils::replace_param(watched::ITEM, "{id}", media_id);
        self.post_flag::<()>(&path, None).await
    }

    async fn unmark_watched(&self, media_id: &MediaId) -> ApiResult<bool> {
        self.delete_flag(&utils::replace_param(watched::ITEM, "{id}", media_id))
            .await
    }
}
