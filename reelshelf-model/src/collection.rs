use crate::ids::{CollectionId, MediaId};
use crate::media::MediaItem;

/// A user-owned, named, ordered list of media records.
///
/// `count` mirrors `items.len()`; it is kept as a field because it is part of
/// the shape UI consumers render and the shape the API reports.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub count: usize,
    pub items: Vec<MediaItem>,
}

impl Collection {
    /// Build a collection whose count is derived from `items`.
    pub fn new(
        id: CollectionId,
        name: impl Into<String>,
        items: Vec<MediaItem>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            count: items.len(),
            items,
        }
    }

    pub fn empty(id: CollectionId, name: impl Into<String>) -> Self {
        Self::new(id, name, Vec::new())
    }

    pub fn contains(&self, media_id: &MediaId) -> bool {
        self.items.iter().any(|item| &item.id == media_id)
    }

    pub fn position_of(&self, media_id: &MediaId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == media_id)
    }

    /// Ordered identifiers, the shape persisted by the API.
    pub fn item_ids(&self) -> Vec<MediaId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Wire shape of a collection: identifiers only, no media records.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApiCollection {
    pub id: CollectionId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub count: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<MediaId>,
}

impl ApiCollection {
    pub fn new(
        id: impl Into<CollectionId>,
        name: impl Into<String>,
        items: Vec<MediaId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count: items.len(),
            items,
        }
    }
}

/// Partial update accepted by the collection update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollectionPatch {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub name: Option<String>,
}

impl CollectionPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}
