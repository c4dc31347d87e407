//! ApiClient against a local axum server speaking the REST API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header::AUTHORIZATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use reelshelf_client::ApiClient;
use reelshelf_client::routes::{collections, media, watched};
use reelshelf_contracts::{
    ApiError, CollectionPersistence, MediaDirectory, WatchHistory,
};
use reelshelf_core::testing::MediaBuilder;
use reelshelf_core::{CollectionStore, MediaQueryBuilder, WatchedStore};
use reelshelf_model::{
    ApiCollection, CollectionId, CollectionPatch, MediaId, MediaItem,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

const TOKEN: &str = "test-token";

#[derive(Default)]
struct Backend {
    collections: Vec<ApiCollection>,
    media: Vec<MediaItem>,
    watched: Vec<MediaId>,
    next_id: usize,
    log: Vec<String>,
    last_search: Option<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Backend>>;

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemBody {
    media_id: MediaId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderBody {
    item_ids: Vec<MediaId>,
}

fn failure(status: StatusCode, message: Option<&str>) -> Response {
    match message {
        Some(message) => (status, Json(json!({ "message": message }))).into_response(),
        None => status.into_response(),
    }
}

fn success(flag: bool) -> Response {
    Json(json!({ "success": flag })).into_response()
}

async fn require_token(
    State(backend): State<Shared>,
    request: Request,
    next: Next,
) -> Response {
    backend
        .lock()
        .await
        .log
        .push(format!("{} {}", request.method(), request.uri().path()));

    let expected = format!("Bearer {TOKEN}");
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return failure(StatusCode::UNAUTHORIZED, Some("Missing token"));
    }
    next.run(request).await
}

async fn list_collections(State(backend): State<Shared>) -> Json<Vec<ApiCollection>> {
    Json(backend.lock().await.collections.clone())
}

async fn create_collection(
    State(backend): State<Shared>,
    Json(body): Json<NameBody>,
) -> Response {
    if body.name == "taken" {
        return failure(StatusCode::CONFLICT, Some("Name taken"));
    }
    let mut backend = backend.lock().await;
    backend.next_id += 1;
    let created =
        ApiCollection::new(format!("c{}", backend.next_id), body.name, vec![]);
    backend.collections.push(created.clone());
    Json(created).into_response()
}

async fn update_collection(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(patch): Json<CollectionPatch>,
) -> Response {
    let mut backend = backend.lock().await;
    let Some(collection) = backend
        .collections
        .iter_mut()
        .find(|c| c.id.as_str() == id)
    else {
        return failure(StatusCode::NOT_FOUND, None);
    };
    if let Some(name) = patch.name {
        collection.name = name.trim().to_string();
    }
    Json(collection.clone()).into_response()
}

async fn delete_collection(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> StatusCode {
    backend.lock().await.collections.retain(|c| c.id.as_str() != id);
    StatusCode::NO_CONTENT
}

async fn add_item(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<AddItemBody>,
) -> Response {
    if body.media_id.as_str() == "blocked" {
        return success(false);
    }
    let mut backend = backend.lock().await;
    match backend.collections.iter_mut().find(|c| c.id.as_str() == id) {
        Some(collection) => {
            collection.items.push(body.media_id);
            collection.count = collection.items.len();
            success(true)
        }
        None => failure(StatusCode::NOT_FOUND, Some("Collection not found")),
    }
}

async fn remove_item(
    State(backend): State<Shared>,
    Path((id, media_id)): Path<(String, String)>,
) -> StatusCode {
    let mut backend = backend.lock().await;
    if let Some(collection) =
        backend.collections.iter_mut().find(|c| c.id.as_str() == id)
    {
        collection.items.retain(|m| m.as_str() != media_id);
        collection.count = collection.items.len();
    }
    StatusCode::NO_CONTENT
}

async fn reorder_items(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<ReorderBody>,
) -> Response {
    let mut backend = backend.lock().await;
    match backend.collections.iter_mut().find(|c| c.id.as_str() == id) {
        Some(collection) => {
            collection.items = body.item_ids;
            success(true)
        }
        None => success(false),
    }
}

async fn search_media(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<MediaItem>> {
    let mut backend = backend.lock().await;
    let needle = params.get("search").map(|s| s.to_lowercase());
    let found = backend
        .media
        .iter()
        .filter(|m| {
            needle
                .as_ref()
                .is_none_or(|n| m.title.to_lowercase().contains(n))
        })
        .cloned()
        .collect();
    backend.last_search = Some(params);
    Json(found)
}

async fn media_by_id(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> Response {
    let backend = backend.lock().await;
    match backend.media.iter().find(|m| m.id.as_str() == id) {
        Some(item) => Json(item.clone()).into_response(),
        None => failure(StatusCode::NOT_FOUND, None),
    }
}

async fn media_batch(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<MediaItem>> {
    let backend = backend.lock().await;
    let wanted: Vec<&str> = params
        .get("ids")
        .map(|ids| ids.split(',').collect())
        .unwrap_or_default();
    Json(
        wanted
            .iter()
            .filter_map(|id| backend.media.iter().find(|m| m.id.as_str() == *id))
            .cloned()
            .collect(),
    )
}

async fn popular(State(backend): State<Shared>) -> Json<Vec<MediaItem>> {
    let mut items = backend.lock().await.media.clone();
    items.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    Json(items)
}

async fn new_releases(State(backend): State<Shared>) -> Json<Vec<MediaItem>> {
    let mut items = backend.lock().await.media.clone();
    items.sort_by(|a, b| b.year.cmp(&a.year));
    Json(items)
}

async fn list_watched(State(backend): State<Shared>) -> Json<Vec<MediaId>> {
    Json(backend.lock().await.watched.clone())
}

async fn mark_watched(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> Response {
    let mut backend = backend.lock().await;
    let id = MediaId::new(id);
    if !backend.watched.contains(&id) {
        backend.watched.push(id);
    }
    success(true)
}

async fn unmark_watched(
    State(backend): State<Shared>,
    Path(id): Path<String>,
) -> StatusCode {
    backend.lock().await.watched.retain(|m| m.as_str() != id);
    StatusCode::NO_CONTENT
}

fn catalog() -> Vec<MediaItem> {
    vec![
        MediaBuilder::new("m1").title("Alien").year(1979).rating(8.5).build(),
        MediaBuilder::new("m2").title("Arrival").year(2016).rating(7.9).build(),
        MediaBuilder::new("m3")
            .title("Dark")
            .year(2017)
            .rating(8.7)
            .series()
            .build(),
    ]
}

/// Serve the API under `/api` on an ephemeral port.
async fn spawn_server(backend: Backend) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(backend));

    let api = Router::new()
        .route(collections::LIST, get(list_collections).post(create_collection))
        .route(
            collections::ITEM,
            put(update_collection).delete(delete_collection),
        )
        .route(collections::ITEMS, post(add_item))
        .route(collections::ITEM_ENTRY, axum::routing::delete(remove_item))
        .route(collections::REORDER, put(reorder_items))
        .route(media::LIST, get(search_media))
        .route(media::ITEM, get(media_by_id))
        .route(media::BATCH, get(media_batch))
        .route(media::POPULAR, get(popular))
        .route(media::NEW, get(new_releases))
        .route(watched::LIST, get(list_watched))
        .route(watched::ITEM, post(mark_watched).delete(unmark_watched))
        .layer(middleware::from_fn_with_state(shared.clone(), require_token))
        .with_state(shared.clone());
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api/"), shared)
}

async fn client_for(backend: Backend) -> (Arc<ApiClient>, Shared) {
    let (url, shared) = spawn_server(backend).await;
    let client = ApiClient::new(url).unwrap();
    client.set_token(Some(TOKEN.to_string())).await;
    (Arc::new(client), shared)
}

#[tokio::test]
async fn collection_endpoints_round_trip() {
    let (client, backend) = client_for(Backend::default()).await;

    let created = client.create_collection("Weekend").await.unwrap();
    assert_eq!(created.id.as_str(), "c1");
    assert_eq!(created.count, 0);

    assert!(client.add_item(&created.id, &"m1".into()).await.unwrap());
    assert!(client.add_item(&created.id, &"m2".into()).await.unwrap());
    assert!(
        client
            .reorder_items(&created.id, &["m2".into(), "m1".into()])
            .await
            .unwrap()
    );
    client.remove_item(&created.id, &"m1".into()).await.unwrap();

    let renamed = client
        .update_collection(&created.id, &CollectionPatch::rename("Sunday"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Sunday");

    let listed = client.list_collections().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].items, vec![MediaId::new("m2")]);

    client.delete_collection(&created.id).await.unwrap();
    assert!(client.list_collections().await.unwrap().is_empty());

    let log = backend.lock().await.log.clone();
    assert!(log.contains(&"PUT /collections/c1/items/reorder".to_string()));
    assert!(log.contains(&"DELETE /collections/c1/items/m1".to_string()));
}

#[tokio::test]
async fn rejection_flags_and_error_messages() {
    let (client, _) = client_for(Backend::default()).await;
    let created = client.create_collection("Queue").await.unwrap();

    assert!(!client.add_item(&created.id, &"blocked".into()).await.unwrap());

    let err = client.create_collection("taken").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 409,
            message: "Name taken".into()
        }
    );

    let err = client
        .update_collection(&CollectionId::new("nope"), &CollectionPatch::rename("x"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API error: 404");
}

#[tokio::test]
async fn unauthorized_clears_the_token() {
    let (client, _) = client_for(Backend::default()).await;
    client.set_token(Some("stale".into())).await;

    let err = client.list_collections().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(client.get_token().await, None);

    let err = client.popular().await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn transport_failures_are_reported() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let err = client.list_watched().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn media_directory_endpoints() {
    let (client, backend) = client_for(Backend {
        media: catalog(),
        ..Backend::default()
    })
    .await;

    assert!(client.get_by_ids(&[]).await.unwrap().is_empty());
    assert!(backend.lock().await.log.is_empty());

    let batch = client
        .get_by_ids(&["m3".into(), "gone".into(), "m1".into()])
        .await
        .unwrap();
    let ids: Vec<_> = batch.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m3", "m1"]);

    let dark = client.get_by_id(&"m3".into()).await.unwrap();
    assert!(dark.is_series());
    assert!(client.get_by_id(&"gone".into()).await.unwrap_err().is_not_found());

    let popular: Vec<_> = client
        .popular()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.title)
        .collect();
    assert_eq!(popular, vec!["Dark", "Alien", "Arrival"]);
    assert_eq!(client.new_releases().await.unwrap()[0].title, "Dark");

    let query = MediaQueryBuilder::new()
        .search("ar")
        .genre("Drama")
        .genre("Sci-Fi")
        .year_range(1970, 2020)
        .build();
    let found = client.search(&query).await.unwrap();
    assert_eq!(found.len(), 2);

    let params = backend.lock().await.last_search.clone().unwrap();
    assert_eq!(params.get("search").map(String::as_str), Some("ar"));
    assert_eq!(params.get("genres").map(String::as_str), Some("Drama,Sci-Fi"));
    assert_eq!(params.get("yearFrom").map(String::as_str), Some("1970"));
    assert_eq!(params.get("yearTo").map(String::as_str), Some("2020"));
    assert!(!params.contains_key("type"));
}

#[tokio::test]
async fn watched_endpoints_drive_the_watched_store() {
    let (client, backend) = client_for(Backend {
        watched: vec!["m1".into()],
        ..Backend::default()
    })
    .await;

    let store = WatchedStore::new(client.clone());
    store.refresh().await;
    assert!(store.is_watched(&"m1".into()));

    store.mark_watched("m2").await.unwrap();
    store.unmark_watched("m1").await.unwrap();
    assert!(store.toggle_watched("m3").await.unwrap());

    assert_eq!(
        backend.lock().await.watched,
        vec![MediaId::new("m2"), MediaId::new("m3")]
    );
    assert_eq!(
        store.snapshot().watched.as_slice(),
        &[MediaId::new("m2"), MediaId::new("m3")]
    );
}

#[tokio::test]
async fn collection_store_over_http() {
    let (client, backend) = client_for(Backend {
        media: catalog(),
        collections: vec![ApiCollection::new(
            "w",
            "Watchlist",
            vec!["m1".into(), "deleted".into()],
        )],
        ..Backend::default()
    })
    .await;

    let store = CollectionStore::new(client.clone(), client.clone());
    store.refresh().await;
    assert_eq!(store.error(), None);

    let watchlist = store.collection(&"w".into()).unwrap();
    assert_eq!(watchlist.count, 1);

    store.add_to_collection("m2", "w").await.unwrap();
    store.add_to_collection("m3", "w").await.unwrap();
    store.reorder_collection_items("w", 2, 0).await.unwrap();
    store.remove_from_collection("m1", "w").await.unwrap();
    store.rename_collection("w", "Tonight").await.unwrap();

    let local: Vec<_> = store
        .collection(&"w".into())
        .unwrap()
        .item_ids();
    assert_eq!(local, vec![MediaId::new("m3"), MediaId::new("m2")]);

    let remote = backend.lock().await.collections[0].clone();
    assert_eq!(remote.items, local);
    assert_eq!(remote.name, "Tonight");
    assert_eq!(store.collection(&"w".into()).unwrap().name, "Tonight");

    let id = store.create_collection("Later").await.unwrap();
    assert!(store.collection(&id).is_some());
    let err = store.create_collection("taken").await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(err.to_string(), "Remote call failed: Name taken");
}
