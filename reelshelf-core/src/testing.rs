//! In-memory service fakes for exercising the stores without a server.
//!
//! Every fake records the calls it receives, can be told to fail or reject
//! the next call of a given kind, and can hold a call at a [`Gate`] until the
//! test releases it. Gated calls are recorded before they block, so a test
//! can observe that a call was issued while it is still in flight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use reelshelf_contracts::{
    ApiError, ApiResult, CollectionPersistence, MediaDirectory, WatchHistory,
};
use reelshelf_model::{
    ApiCollection, CollectionId, CollectionPatch, MediaId, MediaItem,
    MediaQuery, MediaType,
};
use tokio::sync::Notify;

/// Minimal movie record whose title is its id.
pub fn media(id: &str) -> MediaItem {
    MediaBuilder::new(id).build()
}

/// Builder for catalog records in tests
#[derive(Debug, Clone)]
pub struct MediaBuilder {
    item: MediaItem,
}

impl MediaBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            item: MediaItem {
                id: MediaId::new(id),
                title: id.to_string(),
                poster: format!("/posters/{id}.jpg"),
                year: 2020,
                rating: 7.0,
                media_type: MediaType::Movie,
                genres: Vec::new(),
                description: String::new(),
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.item.title = title.to_string();
        self
    }

    pub fn year(mut self, year: u16) -> Self {
        self.item.year = year;
        self
    }

    pub fn rating(mut self, rating: f32) -> Self {
        self.item.rating = rating;
        self
    }

    pub fn series(mut self) -> Self {
        self.item.media_type = MediaType::Series;
        self
    }

    pub fn genre(mut self, genre: &str) -> Self {
        self.item.genres.push(genre.to_string());
        self
    }

    pub fn build(self) -> MediaItem {
        self.item
    }
}

/// Holds one gated call until released.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    notify: Arc<Notify>,
}

impl Gate {
    pub fn release(&self) {
        self.notify.notify_one();
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Failure/rejection/gate switches keyed by operation kind.
#[derive(Debug)]
struct Switches<Op> {
    failures: Mutex<HashSet<Op>>,
    rejections: Mutex<HashSet<Op>>,
    gates: Mutex<HashMap<Op, Gate>>,
}

impl<Op> Default for Switches<Op> {
    fn default() -> Self {
        Self {
            failures: Mutex::new(HashSet::new()),
            rejections: Mutex::new(HashSet::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }
}

impl<Op> Switches<Op>
where
    Op: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    fn pause_next(&self, op: Op) -> Gate {
        let gate = Gate::default();
        self.gates.lock().insert(op, gate.clone());
        gate
    }

    /// Wait at a pending gate, then apply a pending failure.
    async fn pass(&self, op: Op) -> ApiResult<()> {
        let gate = self.gates.lock().remove(&op);
        if let Some(gate) = gate {
            gate.wait().await;
        }
        if self.failures.lock().remove(&op) {
            return Err(ApiError::status(500, Some(format!("{op:?} failed"))));
        }
        Ok(())
    }

    fn take_rejection(&self, op: Op) -> bool {
        self.rejections.lock().remove(&op)
    }
}

async fn settle_calls(count: impl Fn() -> usize, expected: usize) {
    for _ in 0..1_000 {
        if count() >= expected {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected at least {expected} calls, saw {}", count());
}

// === Persistence ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistenceOp {
    List,
    Create,
    Update,
    Delete,
    AddItem,
    RemoveItem,
    Reorder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceCall {
    List,
    Create(String),
    Update(CollectionId, CollectionPatch),
    Delete(CollectionId),
    AddItem(CollectionId, MediaId),
    RemoveItem(CollectionId, MediaId),
    Reorder(CollectionId, Vec<MediaId>),
}

impl PersistenceCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, PersistenceCall::List)
    }
}

#[derive(Debug, Default)]
pub struct FakePersistence {
    collections: Mutex<Vec<ApiCollection>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<PersistenceCall>>,
    switches: Switches<PersistenceOp>,
}

impl FakePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collections(collections: Vec<ApiCollection>) -> Self {
        let fake = Self::default();
        *fake.collections.lock() = collections;
        fake
    }

    /// Server-side view of one collection
    pub fn stored(&self, id: &str) -> Option<ApiCollection> {
        self.collections
            .lock()
            .iter()
            .find(|c| c.id.as_str() == id)
            .cloned()
    }

    pub fn calls(&self) -> Vec<PersistenceCall> {
        self.calls.lock().clone()
    }

    pub fn mutation_calls(&self) -> Vec<PersistenceCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn fail_next(&self, op: PersistenceOp) {
        self.switches.failures.lock().insert(op);
    }

    /// Next call of `op` answers `success: false` (flag-returning ops only)
    pub fn reject_next(&self, op: PersistenceOp) {
        self.switches.rejections.lock().insert(op);
    }

    pub fn pause_next(&self, op: PersistenceOp) -> Gate {
        self.switches.pause_next(op)
    }

    /// Yield until at least `expected` calls were recorded.
    pub async fn wait_for_calls(&self, expected: usize) {
        settle_calls(|| self.calls.lock().len(), expected).await;
    }

    async fn enter(&self, op: PersistenceOp, call: PersistenceCall) -> ApiResult<()> {
        self.calls.lock().push(call);
        self.switches.pass(op).await
    }

    fn with_stored<T>(
        &self,
        id: &CollectionId,
        apply: impl FnOnce(&mut ApiCollection) -> T,
    ) -> ApiResult<T> {
        let mut collections = self.collections.lock();
        let collection = collections
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| ApiError::status(404, Some("Collection not found".into())))?;
        let result = apply(collection);
        collection.count = collection.items.len();
        Ok(result)
    }
}

#[async_trait]
impl CollectionPersistence for FakePersistence {
    async fn list_collections(&self) -> ApiResult<Vec<ApiCollection>> {
        self.enter(PersistenceOp::List, PersistenceCall::List).await?;
        Ok(self.collections.lock().clone())
    }

    async fn create_collection(&self, name: &str) -> ApiResult<ApiCollection> {
        self.enter(PersistenceOp::Create, PersistenceCall::Create(name.to_string()))
            .await?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = ApiCollection::new(format!("collection-{n}"), name, Vec::new());
        self.collections.lock().push(created.clone());
        Ok(created)
    }

    async fn update_collection(
        &self,
        id: &CollectionId,
        patch: &CollectionPatch,
    ) -> ApiResult<ApiCollection> {
        self.enter(
            PersistenceOp::Update,
            PersistenceCall::Update(id.clone(), patch.clone()),
        )
        .await?;
        self.with_stored(id, |collection| {
            if let Some(name) = &patch.name {
                collection.name = name.clone();
            }
        })?;
        self.with_stored(id, |collection| collection.clone())
    }

    async fn delete_collection(&self, id: &CollectionId) -> ApiResult<()> {
        self.enter(PersistenceOp::Delete, PersistenceCall::Delete(id.clone()))
            .await?;
        let mut collections = self.collections.lock();
        let before = collections.len();
        collections.retain(|c| &c.id != id);
        if collections.len() == before {
            return Err(ApiError::status(404, Some("Collection not found".into())));
        }
        Ok(())
    }

    async fn add_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<bool> {
        self.enter(
            PersistenceOp::AddItem,
            PersistenceCall::AddItem(collection_id.clone(), media_id.clone()),
        )
        .await?;
        if self.switches.take_rejection(PersistenceOp::AddItem) {
            return Ok(false);
        }
        self.with_stored(collection_id, |collection| {
            if !collection.items.contains(media_id) {
                collection.items.push(media_id.clone());
            }
        })?;
        Ok(true)
    }

    async fn remove_item(
        &self,
        collection_id: &CollectionId,
        media_id: &MediaId,
    ) -> ApiResult<()> {
        self.enter(
            PersistenceOp::RemoveItem,
            PersistenceCall::RemoveItem(collection_id.clone(), media_id.clone()),
        )
        .await?;
        self.with_stored(collection_id, |collection| {
            collection.items.retain(|id| id != media_id);
        })
    }

    async fn reorder_items(
        &self,
        collection_id: &CollectionId,
        media_ids: &[MediaId],
    ) -> ApiResult<bool> {
        self.enter(
            PersistenceOp::Reorder,
            PersistenceCall::Reorder(collection_id.clone(), media_ids.to_vec()),
        )
        .await?;
        if self.switches.take_rejection(PersistenceOp::Reorder) {
            return Ok(false);
        }
        self.with_stored(collection_id, |collection| {
            collection.items = media_ids.to_vec();
        })?;
        Ok(true)
    }
}

// === Media directory ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectoryOp {
    GetById,
    GetByIds,
    Search,
    Popular,
    NewReleases,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryCall {
    GetById(MediaId),
    GetByIds(Vec<MediaId>),
    Search(MediaQuery),
    Popular,
    NewReleases,
}

#[derive(Debug, Default)]
pub struct FakeDirectory {
    records: Mutex<Vec<MediaItem>>,
    calls: Mutex<Vec<DirectoryCall>>,
    switches: Switches<DirectoryOp>,
}

impl FakeDirectory {
    pub fn with_media(records: Vec<MediaItem>) -> Self {
        let fake = Self::default();
        *fake.records.lock() = records;
        fake
    }

    pub fn insert(&self, item: MediaItem) {
        self.records.lock().push(item);
    }

    /// Drop a record, as if it was deleted upstream
    pub fn forget(&self, id: &str) {
        self.records.lock().retain(|item| item.id.as_str() != id);
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().clone()
    }

    pub fn fail_next(&self, op: DirectoryOp) {
        self.switches.failures.lock().insert(op);
    }

    pub fn pause_next(&self, op: DirectoryOp) -> Gate {
        self.switches.pause_next(op)
    }

    async fn enter(&self, op: DirectoryOp, call: DirectoryCall) -> ApiResult<()> {
        self.calls.lock().push(call);
        self.switches.pass(op).await
    }

    fn sorted_by<K: PartialOrd>(&self, key: impl Fn(&MediaItem) -> K) -> Vec<MediaItem> {
        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| {
            key(b)
                .partial_cmp(&key(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        records
    }
}

#[async_trait]
impl MediaDirectory for FakeDirectory {
    async fn get_by_id(&self, id: &MediaId) -> ApiResult<MediaItem> {
        self.enter(DirectoryOp::GetById, DirectoryCall::GetById(id.clone()))
            .await?;
        self.records
            .lock()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or_else(|| ApiError::status(404, Some(format!("Media {id} not found"))))
    }

    async fn get_by_ids(&self, ids: &[MediaId]) -> ApiResult<Vec<MediaItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.enter(DirectoryOp::GetByIds, DirectoryCall::GetByIds(ids.to_vec()))
            .await?;
        let records = self.records.lock();
        Ok(ids
            .iter()
            .filter_map(|id| records.iter().find(|item| &item.id == id).cloned())
            .collect())
    }

    async fn search(&self, query: &MediaQuery) -> ApiResult<Vec<MediaItem>> {
        self.enter(DirectoryOp::Search, DirectoryCall::Search(query.clone()))
            .await?;
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect())
    }

    async fn popular(&self) -> ApiResult<Vec<MediaItem>> {
        self.enter(DirectoryOp::Popular, DirectoryCall::Popular).await?;
        Ok(self.sorted_by(|item| item.rating))
    }

    async fn new_releases(&self) -> ApiResult<Vec<MediaItem>> {
        self.enter(DirectoryOp::NewReleases, DirectoryCall::NewReleases)
            .await?;
        Ok(self.sorted_by(|item| item.year))
    }
}

// === Watch history ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchOp {
    List,
    Mark,
    Unmark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCall {
    List,
    Mark(MediaId),
    Unmark(MediaId),
}

#[derive(Debug, Default)]
pub struct FakeWatchHistory {
    watched: Mutex<Vec<MediaId>>,
    calls: Mutex<Vec<WatchCall>>,
    switches: Switches<WatchOp>,
}

impl FakeWatchHistory {
    pub fn with_watched(ids: &[&str]) -> Self {
        let fake = Self::default();
        *fake.watched.lock() = ids.iter().map(|id| MediaId::new(*id)).collect();
        fake
    }

    pub fn watched(&self) -> Vec<MediaId> {
        self.watched.lock().clone()
    }

    pub fn calls(&self) -> Vec<WatchCall> {
        self.calls.lock().clone()
    }

    pub fn fail_next(&self, op: WatchOp) {
        self.switches.failures.lock().insert(op);
    }

    pub fn reject_next(&self, op: WatchOp) {
        self.switches.rejections.lock().insert(op);
    }

    pub fn pause_next(&self, op: WatchOp) -> Gate {
        self.switches.pause_next(op)
    }

    pub async fn wait_for_calls(&self, expected: usize) {
        settle_calls(|| self.calls.lock().len(), expected).await;
    }

    async fn enter(&self, op: WatchOp, call: WatchCall) -> ApiResult<()> {
        self.calls.lock().push(call);
        self.switches.pass(op).await
    }
}

#[async_trait]
impl WatchHistory for FakeWatchHistory {
    async fn list_watched(&self) -> ApiResult<Vec<MediaId>> {
        self.enter(WatchOp::List, WatchCall::List).await?;
        Ok(self.watched.lock().clone())
    }

    async fn mark_watched(&self, media_id: &MediaId) -> ApiResult<bool> {
        self.enter(WatchOp::Mark, WatchCall::Mark(media_id.clone()))
            .await?;
        if self.switches.take_rejection(WatchOp::Mark) {
            return Ok(false);
        }
        let mut watched = self.watched.lock();
        if !watched.contains(media_id) {
            watched.push(media_id.clone());
        }
        Ok(true)
    }

    async fn unmark_watched(&self, media_id: &MediaId) -> ApiResult<bool> {
        self.enter(WatchOp::Unmark, WatchCall::Unmark(media_id.clone()))
            .await?;
        if self.switches.take_rejection(WatchOp::Unmark) {
            return Ok(false);
        }
        self.watched.lock().retain(|id| id != media_id);
        Ok(true)
    }
}
