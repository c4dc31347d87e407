use async_trait::async_trait;
use reelshelf_contracts::{ApiResult, CollectionPersistence};
use reelshelf_model::{ApiCollection, CollectionId, CollectionPatch, MediaId};
use serde::Serialize;

use crate::ApiClient;
use crate::routes::{collections, utils};

#[derive(Debug, Serialize)]
struct CreateCollectionRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest<'a> {
    media_id: &'a MediaId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderRequest<'a> {
    item_ids: &'a [MediaId],
}

fn collection_path(route: &str, id: &CollectionId) -> String {
    utils::replace_param(route, "{id}", id)
}

#[async_trait]
impl CollectionPersistence for ApiClient {
    async fn list_collections(&self) -> ApiResult<Vec<ApiCollection>> {
        self.get(collections::LIST).await
    }

    async fn create_collection(&self, name: &str) -> ApiResult<ApiCollection> {
        self.post(collections::LIST, &CreateCollectionRequest { name })
            .await
    }

    async fn update_collection(
        &self,
        id: &CollectionId,
        patch: &CollectionPatch,
    ) -> ApiResult<ApiCollection> {
        self.put(&collection_path(collections::ITEM, id), patch).await
    }

    async fn delete_collection(&self, id: &CollectionId) -> ApiResult<()> {
        self.delete(&collection_path(collections::ITEM, id)).await
    }

    async fn add_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<bool> {
        self.post_flag(
            &collection_path(collections::ITEMS, collection_id),
            Some(&AddItemRequest { media_id }),
        )
        .await
    }

    async fn remove_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<()> {
        let path = utils::replace_params(
            collections::ITEM_ENTRY,
            &[("{id}", collection_id.as_str()), ("{media_id}", media_id.as_str())],
        );
        self.delete(&path).await
    }

    async fn reorder_items(
        &self,
        collection_id: &CollectionId,
        media_ids: &[MediaId],
    ) -> ApiResult<bool> {
        self.put_flag(
            &collection_path(collections::REORDER, collection_id),
            &ReorderRequest { item_ids: media_ids },
        )
        .await
    }
}
