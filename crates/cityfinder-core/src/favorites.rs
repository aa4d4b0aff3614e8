// crates/cityfinder-core/src/favorites.rs
use crate::error::StoreError;
use crate::model::CityId;
use crate::store::KeyValueStore;
use std::collections::HashSet;

/// Ids of the user's favorite cities. May reference cities not currently loaded.
pub type FavoritesSet = HashSet<CityId>;

/// Key the favorites blob is stored under.
pub const FAVORITES_KEY: &str = "FavoriteCityIds";

/// Owns the favorites set and writes it through to a [`KeyValueStore`].
///
/// Every mutation updates the in-memory set first and then persists the whole
/// set as a JSON array of ids. Persistence is best effort: a failed write is
/// logged and kept in [`FavoritesStore::last_persist_error`], the in-memory
/// state stays as mutated and the caller gets no error.
#[derive(Debug)]
pub struct FavoritesStore<S: KeyValueStore> {
    ids: FavoritesSet,
    store: S,
    key: String,
    last_persist_error: Option<StoreError>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Opens the store under [`FAVORITES_KEY`], loading any persisted set.
    pub fn new(store: S) -> Self {
        Self::with_key(store, FAVORITES_KEY)
    }

    /// Opens the store under a custom key.
    ///
    /// A missing or undecodable blob yields an empty set.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let ids = load_ids(&store, &key);
        tracing::debug!(key = %key, count = ids.len(), "favorites loaded");
        Self {
            ids,
            store,
            key,
            last_persist_error: None,
        }
    }

    /// Returns `true` if `id` was not already a favorite.
    pub fn add(&mut self, id: CityId) -> bool {
        let inserted = self.ids.insert(id);
        self.persist();
        inserted
    }

    /// Returns `true` if `id` was a favorite.
    pub fn remove(&mut self, id: CityId) -> bool {
        let removed = self.ids.remove(&id);
        self.persist();
        removed
    }

    /// Flips membership of `id` and returns the new membership.
    pub fn toggle(&mut self, id: CityId) -> bool {
        if self.ids.contains(&id) {
            self.remove(id);
            false
        } else {
            self.add(id);
            true
        }
    }

    #[inline]
    pub fn is_favorite(&self, id: CityId) -> bool {
        self.ids.contains(&id)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.persist();
    }

    /// Borrowed view of the current set.
    #[inline]
    pub fn ids(&self) -> &FavoritesSet {
        &self.ids
    }

    /// Owned copy of the current set.
    pub fn snapshot(&self) -> FavoritesSet {
        self.ids.clone()
    }

    /// Ids in ascending order.
    pub fn sorted_ids(&self) -> Vec<CityId> {
        let mut ids: Vec<CityId> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The error of the most recent write, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&StoreError> {
        self.last_persist_error.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec(&self.sorted_ids())
            .map_err(|e| StoreError::Serialize(e.to_string()))
            .and_then(|blob| self.store.set(&self.key, &blob));

        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to persist favorites");
                self.last_persist_error = Some(e);
            }
        }
    }
}

fn load_ids<S: KeyValueStore>(store: &S, key: &str) -> FavoritesSet {
    let blob = match store.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return FavoritesSet::new(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to read favorites, starting empty");
            return FavoritesSet::new();
        }
    };
    match serde_json::from_slice::<Vec<CityId>>(&blob) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "corrupt favorites blob, starting empty");
            FavoritesSet::new()
        }
    }
}
