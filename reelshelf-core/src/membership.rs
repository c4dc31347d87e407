//! Derived "which collections hold this title" lookup.

use std::collections::{HashMap, HashSet};

use reelshelf_model::{Collection, CollectionId, MediaId};

/// Reverse index from media id to the collections containing it.
///
/// Rebuilt from scratch on every committed change, so it can never drift
/// from the collections it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipIndex {
    by_media: HashMap<MediaId, HashSet<CollectionId>>,
}

impl MembershipIndex {
    pub fn build(collections: &[Collection]) -> Self {
        let mut by_media: HashMap<MediaId, HashSet<CollectionId>> =
            HashMap::new();
        for collection in collections {
            for item in &collection.items {
                by_media
                    .entry(item.id.clone())
                    .or_default()
                    .insert(collection.id.clone());
            }
        }
        Self { by_media }
    }

    /// Membership in one collection, or in any collection when
    /// `collection_id` is `None`.
    pub fn contains(
        &self,
        media_id: &MediaId,
        collection_id: Option<&CollectionId>,
    ) -> bool {
        match (self.by_media.get(media_id), collection_id) {
            (Some(holders), Some(id)) => holders.contains(id),
            (Some(holders), None) => !holders.is_empty(),
            (None, _) => false,
        }
    }

    pub fn collections_containing<'a>(
        &'a self,
        media_id: &MediaId,
    ) -> impl Iterator<Item = &'a CollectionId> + use<'a> {
        self.by_media.get(media_id).into_iter().flatten()
    }

    /// Number of distinct titles present in at least one collection
    pub fn len(&self) -> usize {
        self.by_media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_media.is_empty()
    }
}
