//! Record store - the in-memory quote collection.
//!
//! The store keeps records in insertion order and enforces id uniqueness.
//! It serializes as a plain JSON array of records, which is also the wire
//! shape of the persistence slot it is saved to.

use crate::{error::Result, Error, Quote};
use serde::{Deserialize, Serialize};

/// The in-memory, insertion-ordered collection of quote records.
///
/// Lookups are linear; collections this store was designed for are in the
/// tens-to-hundreds of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, rejecting duplicate ids.
    pub fn from_records(records: impl IntoIterator<Item = Quote>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Get a record by id.
    pub fn get(&self, id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    /// Get a mutable record by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Quote> {
        self.quotes.iter_mut().find(|q| q.id == id)
    }

    /// Check if a record with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert a new record. Errors if the id is already present.
    pub fn insert(&mut self, record: Quote) -> Result<()> {
        if self.contains(&record.id) {
            return Err(Error::DuplicateId(record.id));
        }
        self.quotes.push(record);
        Ok(())
    }

    /// Insert a record, or replace the existing record with the same id in
    /// place (its position in the collection is kept).
    pub fn upsert(&mut self, record: Quote) {
        match self.get_mut(&record.id) {
            Some(existing) => *existing = record,
            None => self.quotes.push(record),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Check if the store has no records.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.iter()
    }

    /// Distinct categories, in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for quote in &self.quotes {
            if !seen.contains(&quote.category.as_str()) {
                seen.push(quote.category.as_str());
            }
        }
        seen
    }

    /// Records belonging to a category.
    pub fn quotes_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Quote> {
        self.quotes.iter().filter(move |q| q.category == category)
    }

    /// Serialize to the persistence wire format (JSON array).
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::MalformedPayload(e.to_string()))
    }

    /// Serialize to pretty JSON (export surface).
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::MalformedPayload(e.to_string()))
    }

    /// Deserialize from the persistence wire format, re-checking id
    /// uniqueness.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<Quote> =
            serde_json::from_str(json).map_err(|e| Error::MalformedPayload(e.to_string()))?;
        Self::from_records(records)
    }
}

impl<'a> IntoIterator for &'a QuoteStore {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuoteStore {
        QuoteStore::from_records([
            Quote::new("a", "first", "Motivation", 100),
            Quote::new("b", "second", "Life", 200),
            Quote::new("c", "third", "Motivation", 300),
        ])
        .unwrap()
    }

    #[test]
    fn insert_and_get() {
        let store = sample();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("b").unwrap().text, "second");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn insert_duplicate_rejected() {
        let mut store = sample();
        let result = store.insert(Quote::new("a", "again", "Life", 400));
        assert_eq!(result, Err(Error::DuplicateId("a".into())));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = sample();
        store.upsert(Quote::new("b", "replaced", "Life", 999));

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("b").unwrap().text, "replaced");
        // Position preserved
        let ids: Vec<_> = store.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn upsert_appends_when_absent() {
        let mut store = sample();
        store.upsert(Quote::new("d", "fourth", "Success", 400));
        assert_eq!(store.len(), 4);
        assert_eq!(store.iter().last().unwrap().id, "d");
    }

    #[test]
    fn categories_first_seen_order() {
        let store = sample();
        assert_eq!(store.categories(), vec!["Motivation", "Life"]);
    }

    #[test]
    fn quotes_in_category() {
        let store = sample();
        let motivational: Vec<_> = store
            .quotes_in_category("Motivation")
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(motivational, vec!["a", "c"]);
    }

    #[test]
    fn json_roundtrip_is_a_plain_array() {
        let store = sample();
        let json = store.to_json().unwrap();
        assert!(json.starts_with('['));

        let restored = QuoteStore::from_json(&json).unwrap();
        assert_eq!(store, restored);
    }

    #[test]
    fn from_json_rejects_malformed_payload() {
        assert!(matches!(
            QuoteStore::from_json("{\"not\": \"an array\"}"),
            Err(Error::MalformedPayload(_))
        ));
    }

    #[test]
    fn from_json_rejects_duplicate_ids() {
        let json = r#"[
            {"id": "a", "text": "one", "category": "c", "lastModified": 1},
            {"id": "a", "text": "two", "category": "c", "lastModified": 2}
        ]"#;
        assert_eq!(
            QuoteStore::from_json(json),
            Err(Error::DuplicateId("a".into()))
        );
    }
}
