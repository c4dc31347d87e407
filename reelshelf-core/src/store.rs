//! Client-side mirror of the user's collections.
//!
//! [`CollectionStore`] is the single source of truth for collections within
//! one session. It hydrates wire-shaped collections with media records,
//! mediates every mutation against the persistence service, and publishes
//! an immutable [`CollectionsSnapshot`] after each committed change.
//!
//! Mutations follow commit-then-apply: the remote call happens first and
//! the local state only changes once it succeeded. Mutations addressed to
//! the same collection are serialized in the order they were issued.

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use reelshelf_contracts::{ApiError, CollectionPersistence, MediaDirectory};
use reelshelf_model::{
    Collection, CollectionId, CollectionPatch, MediaId, MediaItem, MediaQuery,
};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::hydrate::{hydrate, referenced_media_ids};
use crate::lanes::Lanes;
use crate::membership::MembershipIndex;
use crate::reorder::move_item;

/// Completion handle for a queued mutation. The operation already holds its
/// place in the collection's queue when this is returned.
pub type Pending<T> = BoxFuture<'static, StoreResult<T>>;

/// Point-in-time view of the store.
///
/// Snapshots are replaced wholesale on every change; consumers never see a
/// half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct CollectionsSnapshot {
    pub collections: Arc<Vec<Collection>>,
    pub membership: Arc<MembershipIndex>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CollectionsSnapshot {
    pub fn collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| &c.id == id)
    }

    pub fn is_in_collection(
        &self,
        media_id: &MediaId,
        collection_id: Option<&CollectionId>,
    ) -> bool {
        self.membership.contains(media_id, collection_id)
    }
}

/// Cheaply cloneable handle to the collection state.
///
/// Construct one per session and pass clones to consumers. Mutating methods
/// must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    persistence: Arc<dyn CollectionPersistence>,
    directory: Arc<dyn MediaDirectory>,
    state: watch::Sender<CollectionsSnapshot>,
    lanes: Lanes<CollectionId>,
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.state.borrow();
        f.debug_struct("CollectionStore")
            .field("collections", &snapshot.collections.len())
            .field("loading", &snapshot.loading)
            .field("error", &snapshot.error)
            .field("lanes", &self.inner.lanes)
            .finish()
    }
}

impl CollectionStore {
    pub fn new(
        persistence: Arc<dyn CollectionPersistence>,
        directory: Arc<dyn MediaDirectory>,
    ) -> Self {
        let (state, _) = watch::channel(CollectionsSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                persistence,
                directory,
                state,
                lanes: Lanes::default(),
            }),
        }
    }

    // === Queries ===

    pub fn snapshot(&self) -> CollectionsSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified after every state replacement
    pub fn subscribe(&self) -> watch::Receiver<CollectionsSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn collections(&self) -> Arc<Vec<Collection>> {
        Arc::clone(&self.inner.state.borrow().collections)
    }

    pub fn loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    pub fn collection(&self, id: &CollectionId) -> Option<Collection> {
        self.inner.state.borrow().collection(id).cloned()
    }

    /// Membership in `collection_id`, or in any collection when `None`.
    /// Answered from the membership index; never touches the network.
    pub fn is_in_collection(
        &self,
        media_id: &MediaId,
        collection_id: Option<&CollectionId>,
    ) -> bool {
        self.inner
            .state
            .borrow()
            .membership
            .contains(media_id, collection_id)
    }

    /// Items of one collection that satisfy `query`, in collection order.
    pub fn filter_collection(
        &self,
        collection_id: &CollectionId,
        query: &MediaQuery,
    ) -> Vec<MediaItem> {
        self.inner
            .state
            .borrow()
            .collection(collection_id)
            .map(|collection| {
                collection
                    .items
                    .iter()
                    .filter(|item| query.matches(item))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    // === Synchronization ===

    /// Full resync from the persistence service.
    ///
    /// Failures are captured into the snapshot's `error` field and leave the
    /// previously loaded collections in place.
    pub async fn refresh(&self) {
        self.inner.state.send_modify(|snapshot| {
            snapshot.loading = true;
            snapshot.error = None;
        });

        match self.inner.load().await {
            Ok(collections) => {
                info!(count = collections.len(), "Loaded collections");
                let membership = MembershipIndex::build(&collections);
                self.inner.state.send_modify(|snapshot| {
                    snapshot.collections = Arc::new(collections);
                    snapshot.membership = Arc::new(membership);
                    snapshot.loading = false;
                });
            }
            Err(err) => {
                error!(%err, "Failed to load collections");
                self.inner.state.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.error =
                        Some(format!("Failed to load collections: {err}"));
                });
            }
        }
    }

    // === Commands ===

    /// Create an empty collection and return its service-assigned id.
    pub async fn create_collection(
        &self,
        name: impl Into<String>,
    ) -> StoreResult<CollectionId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let created = self
            .inner
            .persistence
            .create_collection(&name)
            .await
            .map_err(|err| {
                error!(%err, name = %name, "Failed to create collection");
                StoreError::Remote(err)
            })?;

        let id = created.id.clone();
        self.inner.commit(|collections| {
            if !collections.iter().any(|c| c.id == created.id) {
                collections.push(Collection::empty(created.id, created.name));
            }
        });
        info!(collection = %id, "Created collection");
        Ok(id)
    }

    /// Delete a collection. Unknown ids succeed without a remote call.
    pub fn delete_collection(&self, id: impl Into<CollectionId>) -> Pending<()> {
        let id = id.into();
        let inner = Arc::clone(&self.inner);
        let key = id.clone();
        let reply = self
            .inner
            .lanes
            .submit(&key, async move { inner.delete(id).await });
        Box::pin(settle(reply))
    }

    pub fn rename_collection(
        &self,
        id: impl Into<CollectionId>,
        name: impl Into<String>,
    ) -> Pending<()> {
        let (id, name) = (id.into(), name.into());
        if name.trim().is_empty() {
            let rejected: StoreResult<()> = Err(ValidationError::EmptyName.into());
            return Box::pin(future::ready(rejected));
        }

        let inner = Arc::clone(&self.inner);
        let key = id.clone();
        let reply = self
            .inner
            .lanes
            .submit(&key, async move { inner.rename(id, name).await });
        Box::pin(settle(reply))
    }

    /// Add a title to a collection. Already-present titles are a no-op.
    pub fn add_to_collection(
        &self,
        media_id: impl Into<MediaId>,
        collection_id: impl Into<CollectionId>,
    ) -> Pending<()> {
        let (media_id, collection_id) = (media_id.into(), collection_id.into());
        let inner = Arc::clone(&self.inner);
        let key = collection_id.clone();
        let reply = self.inner.lanes.submit(&key, async move {
            inner.add(media_id, collection_id).await
        });
        Box::pin(settle(reply))
    }

    /// Remove a title from a collection. Absent titles are a no-op.
    pub fn remove_from_collection(
        &self,
        media_id: impl Into<MediaId>,
        collection_id: impl Into<CollectionId>,
    ) -> Pending<()> {
        let (media_id, collection_id) = (media_id.into(), collection_id.into());
        let inner = Arc::clone(&self.inner);
        let key = collection_id.clone();
        let reply = self.inner.lanes.submit(&key, async move {
            inner.remove(media_id, collection_id).await
        });
        Box::pin(settle(reply))
    }

    /// Move the item at `from` to `to` and commit the full resulting order.
    pub fn reorder_collection_items(
        &self,
        collection_id: impl Into<CollectionId>,
        from: usize,
        to: usize,
    ) -> Pending<()> {
        let collection_id = collection_id.into();
        let inner = Arc::clone(&self.inner);
        let key = collection_id.clone();
        let reply = self.inner.lanes.submit(&key, async move {
            inner.reorder(collection_id, from, to).await
        });
        Box::pin(settle(reply))
    }
}

/// Resolve a lane reply; a lost reply means the worker went away.
pub(crate) async fn settle<T>(
    reply: oneshot::Receiver<StoreResult<T>>,
) -> StoreResult<T> {
    reply.await.unwrap_or(Err(StoreError::Dropped))
}

fn remote_failure(
    action: &'static str,
    collection_id: &CollectionId,
    err: ApiError,
) -> StoreError {
    error!(collection = %collection_id, %err, "Failed to {action}");
    StoreError::Remote(err)
}

impl StoreInner {
    async fn load(&self) -> Result<Vec<Collection>, ApiError> {
        let api_collections = self.persistence.list_collections().await?;
        let ids = referenced_media_ids(&api_collections);
        debug!(
            collections = api_collections.len(),
            media = ids.len(),
            "Resolving collection media"
        );
        let records = self.directory.get_by_ids(&ids).await?;
        Ok(hydrate(api_collections, records))
    }

    fn find(&self, id: &CollectionId) -> StoreResult<Collection> {
        self.state
            .borrow()
            .collection(id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownCollection(id.clone()).into())
    }

    /// Replace the collections with an edited copy and rebuild the index.
    fn commit(&self, apply: impl FnOnce(&mut Vec<Collection>)) {
        self.state.send_modify(|snapshot| {
            let mut next = snapshot.collections.as_ref().clone();
            apply(&mut next);
            snapshot.membership = Arc::new(MembershipIndex::build(&next));
            snapshot.collections = Arc::new(next);
        });
    }

    fn commit_collection(
        &self,
        id: &CollectionId,
        apply: impl FnOnce(&mut Collection),
    ) {
        self.commit(|collections| {
            match collections.iter_mut().find(|c| &c.id == id) {
                Some(collection) => {
                    apply(collection);
                    collection.count = collection.items.len();
                }
                // A concurrent refresh no longer reports it.
                None => warn!(
                    collection = %id,
                    "Collection disappeared before commit; local update skipped"
                ),
            }
        });
    }

    async fn delete(&self, id: CollectionId) -> StoreResult<()> {
        if self.find(&id).is_err() {
            debug!(collection = %id, "Delete of unknown collection ignored");
            return Ok(());
        }

        self.persistence
            .delete_collection(&id)
            .await
            .map_err(|err| remote_failure("delete collection", &id, err))?;

        self.commit(|collections| collections.retain(|c| c.id != id));
        info!(collection = %id, "Deleted collection");
        Ok(())
    }

    async fn rename(&self, id: CollectionId, name: String) -> StoreResult<()> {
        let current = self.find(&id)?;
        if current.name == name {
            return Ok(());
        }

        let updated = self
            .persistence
            .update_collection(&id, &CollectionPatch::rename(name))
            .await
            .map_err(|err| remote_failure("rename collection", &id, err))?;

        self.commit_collection(&id, |collection| {
            collection.name = updated.name;
        });
        debug!(collection = %id, "Renamed collection");
        Ok(())
    }

    async fn add(
        &self,
        media_id: MediaId,
        collection_id: CollectionId,
    ) -> StoreResult<()> {
        let collection = self.find(&collection_id)?;
        if collection.contains(&media_id) {
            debug!(
                collection = %collection_id,
                media = %media_id,
                "Media already in collection"
            );
            return Ok(());
        }

        let accepted = self
            .persistence
            .add_item(&collection_id, &media_id)
            .await
            .map_err(|err| remote_failure("add media to", &collection_id, err))?;
        if !accepted {
            return Err(remote_failure(
                "add media to",
                &collection_id,
                ApiError::Rejected(format!(
                    "adding {media_id} to collection {collection_id}"
                )),
            ));
        }

        let item = self
            .directory
            .get_by_id(&media_id)
            .await
            .map_err(|err| remote_failure("resolve media for", &collection_id, err))?;

        self.commit_collection(&collection_id, |collection| {
            if !collection.contains(&media_id) {
                collection.items.push(item);
            }
        });
        debug!(collection = %collection_id, media = %media_id, "Added media");
        Ok(())
    }

    async fn remove(
        &self,
        media_id: MediaId,
        collection_id: CollectionId,
    ) -> StoreResult<()> {
        let collection = self.find(&collection_id)?;
        if !collection.contains(&media_id) {
            return Ok(());
        }

        self.persistence
            .remove_item(&collection_id, &media_id)
            .await
            .map_err(|err| {
                remote_failure("remove media from", &collection_id, err)
            })?;

        self.commit_collection(&collection_id, |collection| {
            collection.items.retain(|item| item.id != media_id);
        });
        debug!(collection = %collection_id, media = %media_id, "Removed media");
        Ok(())
    }

    async fn reorder(
        &self,
        collection_id: CollectionId,
        from: usize,
        to: usize,
    ) -> StoreResult<()> {
        let collection = self.find(&collection_id)?;
        let reordered = move_item(&collection.items, from, to)?;
        let order: Vec<MediaId> =
            reordered.iter().map(|item| item.id.clone()).collect();

        let accepted = self
            .persistence
            .reorder_items(&collection_id, &order)
            .await
            .map_err(|err| remote_failure("reorder", &collection_id, err))?;
        if !accepted {
            return Err(remote_failure(
                "reorder",
                &collection_id,
                ApiError::Rejected(format!("reordering {collection_id}")),
            ));
        }

        self.commit_collection(&collection_id, |collection| {
            collection.items = reordered;
        });
        debug!(collection = %collection_id, from, to, "Reordered collection");
        Ok(())
    }
}
