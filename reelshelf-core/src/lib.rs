//! # Reelshelf Core
//!
//! Client-side state for the Reelshelf media catalog: the user's collections
//! and watched list, kept consistent with the remote services.
//!
//! ## Overview
//!
//! - **Collections**: [`CollectionStore`] hydrates collections with full
//!   media records, answers membership queries locally, and mediates every
//!   mutation against [`CollectionPersistence`](reelshelf_contracts::CollectionPersistence)
//! - **Watched list**: [`WatchedStore`] mirrors the user's watched titles
//! - **Queries**: [`MediaQueryBuilder`] and [`filter_media`] for catalog filtering
//!
//! Mutations commit remotely before touching local state, and mutations for
//! the same collection run strictly in the order they were issued.
//!
//! ## Feature Flags
//!
//! - `test-utils`: in-memory fakes of every service contract under [`testing`]
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use reelshelf_contracts::{CollectionPersistence, MediaDirectory};
//! use reelshelf_core::{CollectionStore, StoreResult};
//!
//! async fn favourite(
//!     persistence: Arc<dyn CollectionPersistence>,
//!     directory: Arc<dyn MediaDirectory>,
//! ) -> StoreResult<()> {
//!     let store = CollectionStore::new(persistence, directory);
//!     store.refresh().await;
//!
//!     let favourites = store.create_collection("Favourites").await?;
//!     store.add_to_collection("tt0062622", favourites.clone()).await?;
//!     assert!(store.is_in_collection(&"tt0062622".into(), Some(&favourites)));
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod error;
pub mod hydrate;
mod lanes;
pub mod membership;
pub mod query;
pub mod reorder;
pub mod store;
pub mod watched;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{StoreError, StoreResult, ValidationError};
pub use membership::MembershipIndex;
pub use query::{MediaQueryBuilder, filter_media};
pub use reorder::move_item;
pub use store::{CollectionStore, CollectionsSnapshot, Pending};
pub use watched::{WatchedSnapshot, WatchedStore};
