// crates/cityfinder-core/src/search.rs

//! Prefix queries against a [`SortedIndex`].
//!
//! Plain prefix queries binary-search the lower bound and scan the contiguous
//! run of matches, `O(log n + k)`. Favorites-only queries are keyed by id,
//! not by name order, and take one linear pass, `O(n)`.

use crate::favorites::FavoritesSet;
use crate::index::SortedIndex;
use crate::model::City;
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

/// What the user is currently looking for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub prefix: String,
    pub favorites_only: bool,
}

impl QueryParams {
    pub fn new(prefix: impl Into<String>, favorites_only: bool) -> Self {
        Self {
            prefix: prefix.into(),
            favorites_only,
        }
    }

    /// Prefix query over the whole index.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::new(prefix, false)
    }

    /// Prefix query restricted to favorites.
    pub fn favorites(prefix: impl Into<String>) -> Self {
        Self::new(prefix, true)
    }
}

/// Positions of the matching cities inside an index, in index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A contiguous run, produced by plain prefix queries.
    Range(Range<usize>),
    /// Ascending, possibly sparse positions, produced by favorites-only queries.
    Positions(Vec<usize>),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Range(0..0)
    }
}

impl Selection {
    pub fn len(&self) -> usize {
        match self {
            Selection::Range(r) => r.len(),
            Selection::Positions(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index position of the `nth` selected city.
    pub fn position(&self, nth: usize) -> Option<usize> {
        match self {
            Selection::Range(r) => (nth < r.len()).then(|| r.start + nth),
            Selection::Positions(p) => p.get(nth).copied(),
        }
    }
}

/// Iterator over the cities of a query result.
/// Boxed so range and sparse selections share one return type.
pub type CitiesIter<'a> = Box<dyn Iterator<Item = &'a City> + 'a>;

/// Query operations over a sorted city sequence.
pub trait CitySearch {
    /// Smallest position whose folded name is `>=` the folded `prefix`.
    ///
    /// Returns `len()` when every name sorts before the prefix.
    fn lower_bound(&self, prefix: &str) -> usize;

    /// The contiguous run of cities whose name starts with `prefix`.
    fn prefix_range(&self, prefix: &str) -> Range<usize>;

    /// Evaluates `params` and returns the matching positions.
    fn select(&self, params: &QueryParams, favorites: &FavoritesSet) -> Selection;

    /// Evaluates `params` and returns the matching cities in index order.
    fn query(&self, params: &QueryParams, favorites: &FavoritesSet) -> Vec<&City>;
}

impl CitySearch for SortedIndex {
    fn lower_bound(&self, prefix: &str) -> usize {
        let folding = self.folding();
        self.cities()
            .partition_point(|c| folding.compare(c.name(), prefix) == Ordering::Less)
    }

    fn prefix_range(&self, prefix: &str) -> Range<usize> {
        if prefix.is_empty() {
            return 0..self.len();
        }
        let folding = self.folding();
        let start = self.lower_bound(prefix);
        let matched = self.cities()[start..]
            .iter()
            .take_while(|c| folding.starts_with(c.name(), prefix))
            .count();
        start..start + matched
    }

    fn select(&self, params: &QueryParams, favorites: &FavoritesSet) -> Selection {
        if !params.favorites_only {
            return Selection::Range(self.prefix_range(&params.prefix));
        }

        let folding = self.folding();
        let prefix = params.prefix.as_str();
        let positions = self
            .cities()
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                favorites.contains(&c.id())
                    && (prefix.is_empty() || folding.starts_with(c.name(), prefix))
            })
            .map(|(pos, _)| pos)
            .collect();
        Selection::Positions(positions)
    }

    fn query(&self, params: &QueryParams, favorites: &FavoritesSet) -> Vec<&City> {
        match self.select(params, favorites) {
            Selection::Range(r) => self.cities()[r].iter().collect(),
            Selection::Positions(p) => p.into_iter().map(|pos| &self.cities()[pos]).collect(),
        }
    }
}

/// The published output of the last query evaluation.
///
/// Shares the index it was computed from, so cloning a result or handing it
/// to observers never copies cities.
#[derive(Debug, Clone, Default)]
pub struct FilteredResult {
    index: Arc<SortedIndex>,
    selection: Selection,
}

impl FilteredResult {
    pub fn new(index: Arc<SortedIndex>, selection: Selection) -> Self {
        Self { index, selection }
    }

    pub fn len(&self) -> usize {
        self.selection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn get(&self, nth: usize) -> Option<&City> {
        self.selection
            .position(nth)
            .and_then(|pos| self.index.get(pos))
    }

    /// Matching cities, in index order.
    pub fn iter(&self) -> CitiesIter<'_> {
        let cities = self.index.cities();
        match &self.selection {
            Selection::Range(r) => Box::new(cities[r.clone()].iter()),
            Selection::Positions(p) => Box::new(p.iter().map(move |&pos| &cities[pos])),
        }
    }

    pub fn to_vec(&self) -> Vec<City> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;
    use crate::text::Folding;

    fn city(id: i64, name: &str, country: &str, lat: f64, lon: f64) -> City {
        City::new(id, name, country, Coordinates::new(lat, lon))
    }

    fn reference_index() -> SortedIndex {
        SortedIndex::build(vec![
            city(1, "Alabama", "US", 32.806671, -86.79113),
            city(2, "Albuquerque", "US", 35.08449, -106.65014),
            city(3, "Anaheim", "US", 33.83659, -117.91449),
            city(4, "Arizona", "US", 33.729759, -111.43122),
            city(5, "Sydney", "AU", -33.86785, 151.20732),
        ])
    }

    fn seven_cities() -> SortedIndex {
        SortedIndex::build(vec![
            city(10, "Barcelona", "ES", 41.3874, 2.1686),
            city(11, "Buenos Aires", "AR", -34.6037, -58.3816),
            city(12, "Berlin", "DE", 52.52, 13.405),
            city(13, "Bogota", "CO", 4.711, -74.0721),
            city(14, "Madrid", "ES", 40.4168, -3.7038),
            city(15, "Boston", "US", 42.3601, -71.0589),
            city(16, "Bangkok", "TH", 13.7563, 100.5018),
        ])
    }

    fn names<'a>(cities: impl IntoIterator<Item = &'a City>) -> Vec<&'a str> {
        cities.into_iter().map(City::name).collect()
    }

    #[test]
    fn prefix_a_matches_four() {
        let index = reference_index();
        let result = index.query(&QueryParams::prefix("A"), &FavoritesSet::new());
        assert_eq!(names(result), ["Alabama", "Albuquerque", "Anaheim", "Arizona"]);
    }

    #[test]
    fn prefix_al_matches_two() {
        let index = reference_index();
        let result = index.query(&QueryParams::prefix("Al"), &FavoritesSet::new());
        assert_eq!(names(result), ["Alabama", "Albuquerque"]);
    }

    #[test]
    fn lowercase_prefix_matches_case_insensitively() {
        let index = reference_index();
        let result = index.query(&QueryParams::prefix("s"), &FavoritesSet::new());
        assert_eq!(names(result), ["Sydney"]);
    }

    #[test]
    fn empty_prefix_is_identity() {
        let index = reference_index();
        let result = index.query(&QueryParams::default(), &FavoritesSet::new());
        assert_eq!(result.len(), index.len());
        assert!(result.iter().zip(index.iter()).all(|(a, b)| a.id() == b.id()));
        assert_eq!(
            index.select(&QueryParams::default(), &FavoritesSet::new()),
            Selection::Range(0..5)
        );
    }

    #[test]
    fn favorites_only_with_prefix() {
        let index = seven_cities();
        let favorites: FavoritesSet = [10, 11].into_iter().collect();

        let b = index.query(&QueryParams::favorites("B"), &favorites);
        assert_eq!(names(b), ["Barcelona", "Buenos Aires"]);

        let ba = index.query(&QueryParams::favorites("Ba"), &favorites);
        assert_eq!(names(ba), ["Barcelona"]);
    }

    #[test]
    fn favorites_only_empty_prefix_returns_all_favorites_in_order() {
        let index = seven_cities();
        let favorites: FavoritesSet = [14, 11, 16, 999].into_iter().collect();
        let result = index.query(&QueryParams::favorites(""), &favorites);
        assert_eq!(names(result), ["Bangkok", "Buenos Aires", "Madrid"]);
    }

    #[test]
    fn favorites_only_with_no_favorites_is_empty() {
        let index = seven_cities();
        assert!(index
            .query(&QueryParams::favorites(""), &FavoritesSet::new())
            .is_empty());
    }

    #[test]
    fn empty_index_yields_empty_results() {
        let index = SortedIndex::default();
        let favorites: FavoritesSet = [1].into_iter().collect();
        for params in [
            QueryParams::prefix(""),
            QueryParams::prefix("A"),
            QueryParams::favorites(""),
            QueryParams::favorites("A"),
        ] {
            assert!(index.query(&params, &favorites).is_empty());
        }
        assert_eq!(index.lower_bound("A"), 0);
    }

    #[test]
    fn overlong_prefix_is_empty_with_valid_bound() {
        let index = reference_index();
        assert!(index
            .query(&QueryParams::prefix("Alabamaxyz"), &FavoritesSet::new())
            .is_empty());
        assert_eq!(index.lower_bound("zzz"), index.len());
        assert_eq!(index.prefix_range("zzz"), 5..5);
        assert_eq!(index.lower_bound("Alabamaxyz"), 1);
    }

    #[test]
    fn lower_bound_points_at_first_match() {
        let index = reference_index();
        assert_eq!(index.lower_bound("an"), 2);
        assert_eq!(index.prefix_range("AN"), 2..3);
        assert_eq!(index.lower_bound(""), 0);
    }

    #[test]
    fn same_named_cities_are_all_returned_in_country_order() {
        let index = SortedIndex::build(vec![
            city(1, "Springfield", "US", 39.8, -89.6),
            city(2, "Sydney", "AU", -33.8, 151.2),
            city(3, "Springfield", "AU", -27.6, 152.9),
            city(4, "Sydney", "CA", 46.1, -60.2),
        ]);
        let result = index.query(&QueryParams::prefix("spring"), &FavoritesSet::new());
        let ids: Vec<i64> = result.iter().map(|c| c.id()).collect();
        assert_eq!(ids, [3, 1]);
    }

    #[test]
    fn results_keep_original_case() {
        let index = reference_index();
        let result = index.query(&QueryParams::prefix("SYD"), &FavoritesSet::new());
        assert_eq!(result[0].name(), "Sydney");
    }

    #[test]
    fn transliterated_index_matches_accents() {
        let index = SortedIndex::build_with(
            vec![
                city(1, "Évora", "PT", 38.57, -7.91),
                city(2, "Essen", "DE", 51.45, 7.01),
                city(3, "Eindhoven", "NL", 51.44, 5.47),
            ],
            Folding::Transliterate,
        );
        let result = index.query(&QueryParams::prefix("ev"), &FavoritesSet::new());
        assert_eq!(names(result), ["Évora"]);
    }

    #[test]
    fn greek_final_sigma_prefix_finds_capitalized_name() {
        let index = SortedIndex::build(vec![
            city(1, "ΟΔΟΣ", "GR", 0.0, 0.0),
            city(2, "Οδυσσός", "GR", 0.0, 0.0),
            city(3, "Athens", "GR", 37.98, 23.72),
        ]);
        let result = index.query(&QueryParams::prefix("οδος"), &FavoritesSet::new());
        assert_eq!(names(result), ["ΟΔΟΣ"]);
    }

    #[test]
    fn filtered_result_iterates_both_selection_kinds() {
        let index = Arc::new(seven_cities());
        let favorites: FavoritesSet = [12, 15].into_iter().collect();

        let sparse = FilteredResult::new(
            index.clone(),
            index.select(&QueryParams::favorites("b"), &favorites),
        );
        assert_eq!(names(sparse.iter()), ["Berlin", "Boston"]);
        assert_eq!(sparse.get(1).map(City::name), Some("Boston"));
        assert_eq!(sparse.get(2), None);

        let dense = FilteredResult::new(index.clone(), index.select(&QueryParams::prefix("bo"), &favorites));
        assert_eq!(names(dense.iter()), ["Bogota", "Boston"]);
        assert_eq!(dense.to_vec().len(), 2);

        assert!(FilteredResult::default().is_empty());
    }
}
