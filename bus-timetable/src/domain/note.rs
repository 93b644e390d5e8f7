//! Footnote identifiers and text deduplication.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, Serializer};

/// Short identifier of a footnote, unique within one registry.
///
/// Serialized as a decimal string ("1", "2", ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(u32);

impl NoteId {
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deduplicates footnote text to stable identifiers.
///
/// Identical text always receives the same id; new text receives the next
/// id, starting at 1. A registry belongs to exactly one owner (one
/// document while parsing, one route while merging) and is never shared.
///
/// # Examples
///
/// ```
/// use bus_timetable::domain::NoteRegistry;
///
/// let mut notes = NoteRegistry::new();
/// let a = notes.register("출근시간");
/// let b = notes.register("학교경유");
/// assert_eq!(notes.register("출근시간"), a);
/// assert_ne!(a, b);
/// assert_eq!(notes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteRegistry {
    by_text: HashMap<String, NoteId>,
    by_id: BTreeMap<NoteId, String>,
}

impl NoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `text`, allocating a new one on first sight.
    pub fn register(&mut self, text: &str) -> NoteId {
        if let Some(id) = self.by_text.get(text) {
            return *id;
        }
        let id = NoteId(self.by_id.len() as u32 + 1);
        self.by_text.insert(text.to_string(), id);
        self.by_id.insert(id, text.to_string());
        id
    }

    pub fn text(&self, id: NoteId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Notes in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NoteId, &str)> {
        self.by_id.iter().map(|(id, text)| (*id, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Serialize for NoteRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.by_id.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one() {
        let mut notes = NoteRegistry::new();
        assert_eq!(notes.register("출근시간").to_string(), "1");
        assert_eq!(notes.register("학교경유").to_string(), "2");
    }

    #[test]
    fn same_text_same_id() {
        let mut notes = NoteRegistry::new();
        let first = notes.register("학교경유");
        let again = notes.register("학교경유");
        assert_eq!(first, again);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn text_lookup() {
        let mut notes = NoteRegistry::new();
        let id = notes.register("기업도시 경유");
        assert_eq!(notes.text(id), Some("기업도시 경유"));
    }

    #[test]
    fn serializes_as_string_keyed_map() {
        let mut notes = NoteRegistry::new();
        for i in 0..11 {
            notes.register(&format!("note {i}"));
        }
        let json = serde_json::to_string(&notes).unwrap();
        assert!(json.starts_with(r#"{"1":"note 0","2":"note 1""#));
        assert!(json.ends_with(r#""10":"note 9","11":"note 10"}"#));
    }
}
