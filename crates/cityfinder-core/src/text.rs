// crates/cityfinder-core/src/text.rs

//! Case folding used for sort keys and prefix matching.
//!
//! Both the sorter and the search engine compare strings through the same
//! [`Folding`], char by char, without allocating a folded copy per
//! comparison.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How names and country codes are normalized before comparison.
///
/// A [`crate::SortedIndex`] remembers the folding it was sorted with and
/// every query against it uses that same folding, which keeps the binary
/// search lower bound consistent with the sort order.
///
/// Folded strings are ordered by code point, not by a locale collation. Under
/// `Lowercase` an accented initial therefore sorts after `z` (`"Évora"` comes
/// after `"Zurich"`); `Transliterate` puts it among the plain letters.
///
/// Folding is per char, so context-sensitive lowercase rules do not apply.
/// The one such rule that matters for prefixes, Greek final sigma, is
/// normalized: `ς` folds to `σ` on both sides of a comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Folding {
    /// Unicode lowercase (`"ÉVORA"` → `"évora"`).
    #[default]
    Lowercase,
    /// Best-effort ASCII transliteration, then lowercase
    /// (`"Łódź"` → `"lodz"`, `"Évora"` → `"evora"`).
    Transliterate,
}

impl Folding {
    /// Iterates over the folded chars of `s`.
    #[inline]
    pub fn chars(self, s: &str) -> FoldedChars<'_> {
        FoldedChars {
            folding: self,
            source: s.chars(),
            lower: None,
            ascii: "".chars(),
        }
    }

    /// Collects the folded form of `s` into an owned string.
    ///
    /// # Examples
    /// ```rust
    /// use cityfinder_core::Folding;
    ///
    /// assert_eq!(Folding::Lowercase.fold("Buenos Aires"), "buenos aires");
    /// assert_eq!(Folding::Transliterate.fold("Łódź"), "lodz");
    /// ```
    pub fn fold(self, s: &str) -> String {
        self.chars(s).collect()
    }

    /// Lexicographic comparison of the folded forms of `a` and `b`.
    #[inline]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        self.chars(a).cmp(self.chars(b))
    }

    /// Returns `true` if the folded `haystack` starts with the folded `prefix`.
    ///
    /// An empty prefix matches everything.
    #[inline]
    pub fn starts_with(self, haystack: &str, prefix: &str) -> bool {
        let mut rest = self.chars(haystack);
        self.chars(prefix).all(|p| rest.next() == Some(p))
    }
}

/// Iterator returned by [`Folding::chars`].
#[derive(Debug, Clone)]
pub struct FoldedChars<'a> {
    folding: Folding,
    source: std::str::Chars<'a>,
    lower: Option<std::char::ToLowercase>,
    ascii: std::str::Chars<'static>,
}

impl Iterator for FoldedChars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(c) = self.ascii.next() {
                return Some(c.to_ascii_lowercase());
            }
            if let Some(lower) = self.lower.as_mut() {
                if let Some(c) = lower.next() {
                    return Some(c);
                }
                self.lower = None;
            }

            let c = self.source.next()?;
            if c.is_ascii() {
                return Some(c.to_ascii_lowercase());
            }
            match self.folding {
                Folding::Lowercase if c == 'ς' => return Some('σ'),
                Folding::Lowercase => self.lower = Some(c.to_lowercase()),
                Folding::Transliterate => match deunicode::deunicode_char(c) {
                    Some(s) => self.ascii = s.chars(),
                    None => self.lower = Some(c.to_lowercase()),
                },
            }
        }
    }
}
