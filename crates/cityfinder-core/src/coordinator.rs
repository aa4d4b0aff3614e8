// crates/cityfinder-core/src/coordinator.rs

//! # Coordinator
//!
//! Single owner of the index, the query parameters, the favorites and the
//! derived [`FilteredResult`]. Every mutation goes through `&mut self`, so no
//! recomputation can observe a half-applied change.
//!
//! ```text
//!   Idle ──begin_reload──▶ Loading ──ok──▶ Ready
//!                            │  ▲           │
//!                          err  └─reload────┘
//!                            ▼
//!                          Failed ──begin_reload──▶ Loading
//! ```
//!
//! Recomputation happens synchronously on every change while `Ready`. Changes
//! made in any other state are remembered and applied when the next load
//! completes. A completion carrying an outdated [`ReloadToken`] is dropped.

use crate::error::FetchError;
use crate::favorites::FavoritesStore;
use crate::index::SortedIndex;
use crate::model::{City, CityId};
use crate::search::{CitySearch, FilteredResult, QueryParams};
use crate::source::CitySource;
use crate::store::KeyValueStore;
use crate::text::Folding;
use std::fmt;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

/// Identifies one reload request. Later requests carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReloadToken(u64);

impl ReloadToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of a fetch, handed back to the coordinator's thread.
#[derive(Debug)]
pub struct FetchCompletion {
    pub token: ReloadToken,
    pub outcome: Result<Vec<City>, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing loaded yet.
    Idle,
    /// A reload is in flight; recomputation is deferred.
    Loading,
    /// An index is present and results track every change.
    Ready,
    /// The last reload failed; the previous result is kept.
    Failed,
}

/// Handle returned by [`CityCoordinator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

type Observer = Box<dyn FnMut(&FilteredResult)>;

pub struct CityCoordinator<S: KeyValueStore> {
    index: Arc<SortedIndex>,
    params: QueryParams,
    favorites: FavoritesStore<S>,
    result: FilteredResult,
    state: LoadState,
    error: Option<FetchError>,
    folding: Folding,
    latest: ReloadToken,
    pending: bool,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: usize,
}

impl<S: KeyValueStore> CityCoordinator<S> {
    pub fn new(favorites: FavoritesStore<S>) -> Self {
        Self::with_folding(favorites, Folding::default())
    }

    /// Indexes built by this coordinator use `folding`.
    pub fn with_folding(favorites: FavoritesStore<S>, folding: Folding) -> Self {
        Self {
            index: Arc::default(),
            params: QueryParams::default(),
            favorites,
            result: FilteredResult::default(),
            state: LoadState::Idle,
            error: None,
            folding,
            latest: ReloadToken(0),
            pending: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Dataset lifecycle
    // -----------------------------------------------------------------------

    /// Enters `Loading` and returns the token the matching completion must carry.
    ///
    /// Any earlier in-flight reload is superseded.
    pub fn begin_reload(&mut self) -> ReloadToken {
        self.latest = ReloadToken(self.latest.0 + 1);
        self.state = LoadState::Loading;
        self.error = None;
        tracing::debug!(token = %self.latest, "reload started");
        self.latest
    }

    /// Applies a fetch outcome. Returns `false` if it was stale and ignored.
    pub fn complete_reload(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion { token, outcome } = completion;
        if token != self.latest || self.state != LoadState::Loading {
            tracing::debug!(token = %token, latest = %self.latest, "ignoring superseded fetch completion");
            return false;
        }

        match outcome {
            Ok(cities) => {
                let index = SortedIndex::build_with(cities, self.folding);
                tracing::info!(token = %token, cities = index.len(), "dataset loaded");
                self.index = Arc::new(index);
                self.state = LoadState::Ready;
                self.recompute();
            }
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "dataset load failed");
                self.error = Some(e);
                self.state = LoadState::Failed;
            }
        }
        true
    }

    /// Applies every completion already waiting on `rx`; returns how many
    /// were accepted.
    pub fn pump(&mut self, rx: &Receiver<FetchCompletion>) -> usize {
        let mut accepted = 0;
        for completion in rx.try_iter() {
            if self.complete_reload(completion) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Fetches from `source` on the current thread and applies the outcome.
    pub fn reload_from(&mut self, source: &impl CitySource) {
        let token = self.begin_reload();
        let outcome = source.fetch();
        self.complete_reload(FetchCompletion { token, outcome });
    }

    /// Replaces the dataset with `cities` (sorted on the way in).
    pub fn load_cities(&mut self, cities: Vec<City>) {
        let token = self.begin_reload();
        self.complete_reload(FetchCompletion {
            token,
            outcome: Ok(cities),
        });
    }

    // -----------------------------------------------------------------------
    // Query parameters
    // -----------------------------------------------------------------------

    pub fn set_query(&mut self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        if self.params.prefix != prefix {
            self.params.prefix = prefix;
            self.invalidate();
        }
    }

    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        if self.params.favorites_only != favorites_only {
            self.params.favorites_only = favorites_only;
            self.invalidate();
        }
    }

    pub fn toggle_favorites_only(&mut self) {
        self.set_favorites_only(!self.params.favorites_only);
    }

    // -----------------------------------------------------------------------
    // Favorites
    // -----------------------------------------------------------------------

    pub fn add_favorite(&mut self, id: CityId) {
        if self.favorites.add(id) {
            self.invalidate();
        }
    }

    pub fn remove_favorite(&mut self, id: CityId) {
        if self.favorites.remove(id) {
            self.invalidate();
        }
    }

    /// Returns the new membership of `id`.
    pub fn toggle_favorite(&mut self, id: CityId) -> bool {
        let now = self.favorites.toggle(id);
        self.invalidate();
        now
    }

    pub fn clear_favorites(&mut self) {
        let had_any = self.favorites.count() > 0;
        self.favorites.clear();
        if had_any {
            self.invalidate();
        }
    }

    pub fn is_favorite(&self, id: CityId) -> bool {
        self.favorites.is_favorite(id)
    }

    pub fn favorites(&self) -> &FavoritesStore<S> {
        &self.favorites
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Calls `observer` with every result published from now on.
    pub fn subscribe(&mut self, observer: impl FnMut(&FilteredResult) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// The last published result.
    pub fn result(&self) -> &FilteredResult {
        &self.result
    }

    /// Evaluates `prefix` with the current flag and favorites without
    /// publishing anything.
    pub fn search_preview(&self, prefix: &str) -> FilteredResult {
        let params = QueryParams::new(prefix, self.params.favorites_only);
        let selection = self.index.select(&params, self.favorites.ids());
        FilteredResult::new(self.index.clone(), selection)
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn index(&self) -> &SortedIndex {
        &self.index
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// `true` if a query or favorites change is waiting for the next load.
    pub fn has_pending_changes(&self) -> bool {
        self.pending
    }

    /// The error of the last failed reload, if the coordinator is `Failed`.
    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Number of cities in the loaded dataset.
    pub fn total_count(&self) -> usize {
        self.index.len()
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.count()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn invalidate(&mut self) {
        match self.state {
            LoadState::Ready => self.recompute(),
            LoadState::Idle | LoadState::Loading | LoadState::Failed => self.pending = true,
        }
    }

    fn recompute(&mut self) {
        let selection = self.index.select(&self.params, self.favorites.ids());
        self.result = FilteredResult::new(self.index.clone(), selection);
        self.pending = false;
        tracing::debug!(
            prefix = %self.params.prefix,
            favorites_only = self.params.favorites_only,
            matches = self.result.len(),
            "result recomputed"
        );
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.result);
        }
    }
}

impl<S: KeyValueStore> fmt::Debug for CityCoordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityCoordinator")
            .field("state", &self.state)
            .field("cities", &self.index.len())
            .field("params", &self.params)
            .field("favorites", &self.favorites.count())
            .field("matches", &self.result.len())
            .field("pending", &self.pending)
            .field("latest", &self.latest)
            .finish()
    }
}
