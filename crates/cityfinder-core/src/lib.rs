// crates/cityfinder-core/src/lib.rs

//! # cityfinder-core
//!
//! The city search-and-favorites engine.
//!
//! - [`SortedIndex`] keeps the dataset in canonical order (name, then country,
//!   case-insensitive) so prefix queries run as a binary search plus a
//!   contiguous scan.
//! - [`FavoritesStore`] owns the set of favorite city ids and persists it
//!   through an injected [`KeyValueStore`].
//! - [`CityCoordinator`] owns index, query and favorites and republishes the
//!   [`FilteredResult`] every time one of them changes.
//!
//! ```rust
//! use cityfinder_core::prelude::*;
//!
//! let cities = vec![
//!     City::new(1, "Sydney", "AU", Coordinates::new(-33.86785, 151.20732)),
//!     City::new(2, "Alabama", "US", Coordinates::new(32.806671, -86.79113)),
//! ];
//!
//! let favorites = FavoritesStore::new(MemoryStore::new());
//! let mut coordinator = CityCoordinator::new(favorites);
//! coordinator.load_cities(cities);
//! coordinator.set_query("s");
//!
//! let names: Vec<&str> = coordinator.result().iter().map(|c| c.name()).collect();
//! assert_eq!(names, ["Sydney"]);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod favorites;
pub mod index;
pub mod model;
pub mod prelude;
pub mod search;
pub mod source;
pub mod store;
pub mod text;

// Re-exports
pub use crate::config::Config;
pub use crate::coordinator::{CityCoordinator, LoadState, ReloadToken, SubscriptionId};
pub use crate::error::{CityError, FetchError, Result, StoreError};
pub use crate::favorites::{FavoritesSet, FavoritesStore, FAVORITES_KEY};
pub use crate::index::SortedIndex;
pub use crate::model::{City, CityId, CityRecord, Coordinates};
pub use crate::search::{CitySearch, FilteredResult, QueryParams, Selection};
pub use crate::store::{DirStore, KeyValueStore, MemoryStore};
pub use crate::text::Folding;
