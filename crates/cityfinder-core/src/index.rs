// crates/cityfinder-core/src/index.rs

//! # Sorted Index
//!
//! The canonical ordering every prefix query relies on: city name first,
//! country code second, both compared through a [`Folding`] and ascending.
//!
//! A [`SortedIndex`] can only be built by sorting, so holding one is proof the
//! ordering invariant holds. The dataset is always rebuilt wholesale; there is
//! no insert or remove.

use crate::model::City;
use crate::text::Folding;
use std::cmp::Ordering;

/// Orders two cities by `(name, country)` under `folding`.
#[inline]
pub fn compare_cities(folding: Folding, a: &City, b: &City) -> Ordering {
    folding
        .compare(a.name(), b.name())
        .then_with(|| folding.compare(a.country(), b.country()))
}

/// Sorts `cities` into canonical order.
///
/// The sort is stable: cities equal on both keys keep their input order.
/// Sorting an already sorted sequence leaves it unchanged.
pub fn sort_cities(mut cities: Vec<City>, folding: Folding) -> Vec<City> {
    cities.sort_by(|a, b| compare_cities(folding, a, b));
    cities
}

/// Cities in canonical order, together with the folding they were sorted by.
#[derive(Debug, Clone, Default)]
pub struct SortedIndex {
    cities: Vec<City>,
    folding: Folding,
}

impl SortedIndex {
    /// Sorts `cities` with [`Folding::Lowercase`].
    pub fn build(cities: Vec<City>) -> Self {
        Self::build_with(cities, Folding::default())
    }

    pub fn build_with(cities: Vec<City>, folding: Folding) -> Self {
        Self {
            cities: sort_cities(cities, folding),
            folding,
        }
    }

    /// All cities, in canonical order.
    #[inline]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[inline]
    pub fn folding(&self) -> Folding {
        self.folding
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&City> {
        self.cities.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, City> {
        self.cities.iter()
    }

    /// Linear lookup by id.
    pub fn find_by_id(&self, id: crate::CityId) -> Option<&City> {
        self.cities.iter().find(|c| c.id() == id)
    }

    /// Checks the ordering invariant over every adjacent pair.
    pub fn is_sorted(&self) -> bool {
        self.cities
            .windows(2)
            .all(|w| compare_cities(self.folding, &w[0], &w[1]) != Ordering::Greater)
    }
}

impl<'a> IntoIterator for &'a SortedIndex {
    type Item = &'a City;
    type IntoIter = std::slice::Iter<'a, City>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    fn city(id: i64, name: &str, country: &str) -> City {
        City::new(id, name, country, Coordinates::new(0.0, 0.0))
    }

    fn names(index: &SortedIndex) -> Vec<(&str, &str)> {
        index.iter().map(|c| (c.name(), c.country())).collect()
    }

    #[test]
    fn sorts_by_name_then_country() {
        let index = SortedIndex::build(vec![
            city(1, "Sydney", "AU"),
            city(2, "Springfield", "US"),
            city(3, "alabama", "US"),
            city(4, "Springfield", "AU"),
            city(5, "Albuquerque", "US"),
        ]);
        assert_eq!(
            names(&index),
            [
                ("alabama", "US"),
                ("Albuquerque", "US"),
                ("Springfield", "AU"),
                ("Springfield", "US"),
                ("Sydney", "AU"),
            ]
        );
        assert!(index.is_sorted());
    }

    #[test]
    fn country_tie_break_is_case_insensitive() {
        let index = SortedIndex::build(vec![
            city(1, "Paris", "us"),
            city(2, "PARIS", "FR"),
        ]);
        assert_eq!(names(&index), [("PARIS", "FR"), ("Paris", "us")]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let index = SortedIndex::build(vec![
            city(10, "Victoria", "CA"),
            city(11, "victoria", "ca"),
            city(12, "VICTORIA", "CA"),
        ]);
        let ids: Vec<i64> = index.iter().map(City::id).collect();
        assert_eq!(ids, [10, 11, 12]);
    }

    #[test]
    fn sorting_twice_changes_nothing() {
        let once = sort_cities(
            vec![
                city(3, "Córdoba", "ES"),
                city(1, "Cordoba", "AR"),
                city(2, "córdoba", "AR"),
                city(4, "Cairo", "EG"),
            ],
            Folding::Lowercase,
        );
        let twice = sort_cities(once.clone(), Folding::Lowercase);
        let a: Vec<i64> = once.iter().map(City::id).collect();
        let b: Vec<i64> = twice.iter().map(City::id).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn transliterated_index_groups_accents() {
        let index = SortedIndex::build_with(
            vec![
                city(1, "Ewa Beach", "US"),
                city(2, "Évora", "PT"),
                city(3, "Essen", "DE"),
            ],
            Folding::Transliterate,
        );
        let ids: Vec<i64> = index.iter().map(City::id).collect();
        assert_eq!(ids, [3, 2, 1]);
        assert!(index.is_sorted());
    }

    #[test]
    fn find_by_id_ignores_position() {
        let index = SortedIndex::build(vec![
            city(7, "Sydney", "AU"),
            city(3, "Anaheim", "US"),
        ]);
        assert_eq!(index.find_by_id(7).map(City::name), Some("Sydney"));
        assert_eq!(index.get(1).map(City::id), Some(7));
        assert!(index.find_by_id(42).is_none());
    }

    #[test]
    fn empty_index() {
        let index = SortedIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.is_sorted());
        assert_eq!(index.get(0), None);
    }
}
