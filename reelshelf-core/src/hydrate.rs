//! Turning wire-shaped collections into collections of full media records.

use std::collections::{HashMap, HashSet};

use reelshelf_model::{ApiCollection, Collection, MediaId, MediaItem};
use tracing::warn;

/// Distinct media ids referenced by `collections`, in first-seen order.
pub fn referenced_media_ids(collections: &[ApiCollection]) -> Vec<MediaId> {
    let mut seen = HashSet::new();
    collections
        .iter()
        .flat_map(|collection| collection.items.iter())
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Map each collection's identifiers through `records`.
///
/// Identifiers the directory could not resolve are dropped and `count` is
/// recomputed from what remains, so `count == items.len()` holds for every
/// hydrated collection. Duplicate identifiers within one collection are
/// collapsed to their first occurrence.
pub fn hydrate(
    collections: Vec<ApiCollection>,
    records: Vec<MediaItem>,
) -> Vec<Collection> {
    let lookup: HashMap<MediaId, MediaItem> = records
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();

    collections
        .into_iter()
        .map(|api| {
            let mut placed = HashSet::new();
            let mut missing = Vec::new();
            let items: Vec<MediaItem> = api
                .items
                .iter()
                .filter(|id| placed.insert(*id))
                .filter_map(|id| {
                    let found = lookup.get(id).cloned();
                    if found.is_none() {
                        missing.push(id.as_str());
                    }
                    found
                })
                .collect();

            if !missing.is_empty() {
                warn!(
                    collection = %api.id,
                    reported = api.count,
                    hydrated = items.len(),
                    ?missing,
                    "Dropping unresolved media from collection"
                );
            }

            Collection::new(api.id, api.name, items)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::media;

    fn ids(raw: &[&str]) -> Vec<MediaId> {
        raw.iter().map(|id| MediaId::new(*id)).collect()
    }

    #[test]
    fn collects_union_in_first_seen_order() {
        let collections = vec![
            ApiCollection::new("a", "A", ids(&["m2", "m1"])),
            ApiCollection::new("b", "B", ids(&["m1", "m3"])),
        ];
        assert_eq!(
            referenced_media_ids(&collections),
            ids(&["m2", "m1", "m3"])
        );
    }

    #[test]
    fn preserves_persisted_order() {
        let api = vec![ApiCollection::new("w", "Watchlist", ids(&["m1", "m2"]))];
        let hydrated = hydrate(api, vec![media("m2"), media("m1")]);

        assert_eq!(hydrated[0].item_ids(), ids(&["m1", "m2"]));
        assert_eq!(hydrated[0].count, 2);
    }

    #[test]
    fn drops_unresolved_and_recomputes_count() {
        let api = vec![ApiCollection::new("w", "Watchlist", ids(&["m1", "m2"]))];
        assert_eq!(api[0].count, 2);

        let hydrated = hydrate(api, vec![media("m1")]);

        assert_eq!(hydrated[0].item_ids(), ids(&["m1"]));
        assert_eq!(hydrated[0].count, 1);
    }

    #[test]
    fn collapses_duplicate_references() {
        let api = vec![ApiCollection::new("w", "W", ids(&["m1", "m2", "m1"]))];
        let hydrated = hydrate(api, vec![media("m1"), media("m2")]);
        assert_eq!(hydrated[0].item_ids(), ids(&["m1", "m2"]));
    }
}
