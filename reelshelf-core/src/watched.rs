//! Mirror of the user's watched titles.

use std::fmt;
use std::sync::Arc;

use reelshelf_contracts::{ApiError, WatchHistory};
use reelshelf_model::MediaId;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::lanes::Lanes;
use crate::store::{Pending, settle};

#[derive(Debug, Clone, Default)]
pub struct WatchedSnapshot {
    /// Watched ids in the order the service reported or the user marked them
    pub watched: Arc<Vec<MediaId>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl WatchedSnapshot {
    pub fn is_watched(&self, media_id: &MediaId) -> bool {
        self.watched.contains(media_id)
    }
}

/// Cheaply cloneable handle to the watched list.
///
/// Changes for the same title are serialized in issue order, like
/// collection mutations in [`CollectionStore`](crate::CollectionStore).
#[derive(Clone)]
pub struct WatchedStore {
    inner: Arc<WatchedInner>,
}

struct WatchedInner {
    history: Arc<dyn WatchHistory>,
    state: watch::Sender<WatchedSnapshot>,
    lanes: Lanes<MediaId>,
}

impl fmt::Debug for WatchedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.state.borrow();
        f.debug_struct("WatchedStore")
            .field("watched", &snapshot.watched.len())
            .field("loading", &snapshot.loading)
            .field("error", &snapshot.error)
            .finish()
    }
}

impl WatchedStore {
    pub fn new(history: Arc<dyn WatchHistory>) -> Self {
        let (state, _) = watch::channel(WatchedSnapshot::default());
        Self {
            inner: Arc::new(WatchedInner {
                history,
                state,
                lanes: Lanes::default(),
            }),
        }
    }

    pub fn snapshot(&self) -> WatchedSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchedSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn is_watched(&self, media_id: &MediaId) -> bool {
        self.inner.state.borrow().is_watched(media_id)
    }

    /// Reload the watched list; failures land in the snapshot's `error`.
    pub async fn refresh(&self) {
        self.inner.state.send_modify(|snapshot| {
            snapshot.loading = true;
            snapshot.error = None;
        });

        match self.inner.history.list_watched().await {
            Ok(watched) => {
                info!(count = watched.len(), "Loaded watched list");
                self.inner.state.send_modify(|snapshot| {
                    snapshot.watched = Arc::new(watched);
                    snapshot.loading = false;
                });
            }
            Err(err) => {
                error!(%err, "Failed to load watched list");
                self.inner.state.send_modify(|snapshot| {
                    snapshot.loading = false;
                    snapshot.error =
                        Some(format!("Failed to load watched list: {err}"));
                });
            }
        }
    }

    pub fn mark_watched(
        &self,
        media_id: impl Into<MediaId>,
    ) -> Pending<()> {
        let media_id = media_id.into();
        let inner = Arc::clone(&self.inner);
        let key = media_id.clone();
        let reply = self
            .inner
            .lanes
            .submit(&key, async move { inner.set_watched(media_id, true).await });
        Box::pin(settle(reply))
    }

    pub fn unmark_watched(
        &self,
        media_id: impl Into<MediaId>,
    ) -> Pending<()> {
        let media_id = media_id.into();
        let inner = Arc::clone(&self.inner);
        let key = media_id.clone();
        let reply = self
            .inner
            .lanes
            .submit(&key, async move { inner.set_watched(media_id, false).await });
        Box::pin(settle(reply))
    }

    /// Flip the watched state; resolves to the new state.
    ///
    /// The current state is read when the operation reaches the front of
    /// the title's queue, so back-to-back toggles alternate correctly.
    pub fn toggle_watched(
        &self,
        media_id: impl Into<MediaId>,
    ) -> Pending<bool> {
        let media_id = media_id.into();
        let inner = Arc::clone(&self.inner);
        let key = media_id.clone();
        let reply = self.inner.lanes.submit(&key, async move {
            let target = !inner.state.borrow().is_watched(&media_id);
            inner.set_watched(media_id, target).await.map(|()| target)
        });
        Box::pin(settle(reply))
    }
}

impl WatchedInner {
    async fn set_watched(&self, media_id: MediaId, watched: bool) -> StoreResult<()> {
        if self.state.borrow().is_watched(&media_id) == watched {
            return Ok(());
        }

        let result = if watched {
            self.history.mark_watched(&media_id).await
        } else {
            self.history.unmark_watched(&media_id).await
        };
        let accepted = result.map_err(|err| {
            error!(media = %media_id, %err, watched, "Failed to update watched state");
            StoreError::Remote(err)
        })?;
        if !accepted {
            error!(media = %media_id, watched, "Watched state change rejected");
            return Err(StoreError::Remote(ApiError::Rejected(format!(
                "changing watched state of {media_id}"
            ))));
        }

        self.state.send_modify(|snapshot| {
            let mut next = snapshot.watched.as_ref().clone();
            if watched {
                next.push(media_id.clone());
            } else {
                next.retain(|id| id != &media_id);
            }
            snapshot.watched = Arc::new(next);
        });
        debug!(media = %media_id, watched, "Updated watched state");
        Ok(())
    }
}
