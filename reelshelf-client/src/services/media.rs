use async_trait::async_trait;
use log::debug;
use reelshelf_contracts::{ApiResult, MediaDirectory};
use reelshelf_model::{MediaId, MediaItem, MediaQuery};

use crate::ApiClient;
use crate::routes::{media, utils};

/// Query-string parameters of the catalog search endpoint
pub fn query_params(query: &MediaQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(search) = query.search_text() {
        params.push(("search", search.to_string()));
    }
    if let Some(media_type) = query.media_type {
        params.push(("type", media_type.api_name().to_string()));
    }
    if !query.genres.is_empty() {
        params.push(("genres", query.genres.join(",")));
    }
    if let Some(years) = query.year_range {
        params.push(("yearFrom", years.min.to_string()));
        params.push(("yearTo", years.max.to_string()));
    }
    if let Some(rating) = query.rating_range {
        params.push(("ratingFrom", rating.min.to_string()));
        params.push(("ratingTo", rating.max.to_string()));
    }
    params
}

#[async_trait]
impl MediaDirectory for ApiClient {
    async fn get_by_id(&self, id: &MediaId) -> ApiResult<MediaItem> {
        self.get(&utils::replace_param(media::ITEM, "{id}", id)).await
    }

    async fn get_by_ids(&self, ids: &[MediaId]) -> ApiResult<Vec<MediaItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.iter().map(MediaId::as_str).collect::<Vec<_>>().join(",");
        debug!("[ApiClient] Resolving {} media ids", ids.len());
        self.get(&utils::with_query(media::BATCH, &[("ids", joined)]))
            .await
    }

    async fn search(&self, query: &MediaQuery) -> ApiResult<Vec<MediaItem>> {
        self.get(&utils::with_query(media::LIST, &query_params(query)))
            .await
    }

    async fn popular(&self) -> ApiResult<Vec<MediaItem>> {
        self.get(media::POPULAR).await
    }

    async fn new_releases(&self) -> ApiResult<Vec<MediaItem>> {
        self.get(media::NEW).await
    }
}
