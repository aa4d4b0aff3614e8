//! cityfinder prelude: bring common types and traits into scope for demos.

pub use crate::config::Config;
pub use crate::coordinator::{CityCoordinator, FetchCompletion, LoadState, ReloadToken};
pub use crate::error::{CityError, FetchError, Result, StoreError};
pub use crate::favorites::{FavoritesSet, FavoritesStore, FAVORITES_KEY};
pub use crate::index::{sort_cities, SortedIndex};
pub use crate::model::{City, CityId, CityRecord, Coordinates};
pub use crate::search::{CitySearch, FilteredResult, QueryParams, Selection};
pub use crate::source::{spawn_fetch, CachedSource, CitySource, RetryPolicy, Retrying};
pub use crate::store::{DirStore, KeyValueStore, MemoryStore};
pub use crate::text::Folding;
