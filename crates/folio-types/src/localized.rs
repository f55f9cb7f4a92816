//! Locale-keyed text.
//!
//! A missing locale means "not translated", which is different from a
//! locale mapped to the empty string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Merge instructions for a [`LocalizedMap`].
///
/// `Some(text)` inserts or overwrites a locale, `None` deletes it. Locales
/// not mentioned are left untouched.
pub type LocalizedUpdate = BTreeMap<String, Option<String>>;

/// Mapping from locale code to text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedMap(BTreeMap<String, String>);

impl LocalizedMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Text for a locale, if translated.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Insert or overwrite a locale, returning the previous text.
    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.0.insert(locale.into(), text.into())
    }

    /// Remove a locale, returning its text.
    pub fn remove(&mut self, locale: &str) -> Option<String> {
        self.0.remove(locale)
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.0.contains_key(locale)
    }

    /// Locales in lexicographic order.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply merge instructions in place.
    pub fn merge(&mut self, update: &LocalizedUpdate) {
        for (locale, text) in update {
            match text {
                Some(text) => {
                    self.0.insert(locale.clone(), text.clone());
                }
                None => {
                    self.0.remove(locale);
                }
            }
        }
    }

    /// Like [`merge`](Self::merge) but returns a new map.
    pub fn merged(&self, update: &LocalizedUpdate) -> Self {
        let mut out = self.clone();
        out.merge(update);
        out
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl From<BTreeMap<String, String>> for LocalizedMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
