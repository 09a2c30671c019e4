//! Item name to ID lookup over the game's static item table.
//!
//! The source JSON maps IDs to per-language names:
//! `{ "5057": { "en": "Iron Ore", "de": "Eisenerz", ... }, ... }`.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

use super::entities::ItemId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read item catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed item catalog: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ItemNames {
    #[serde(default)]
    en: Option<String>,
}

/// The top-level object as `(id, names)` pairs in document order.
struct CatalogEntries(Vec<(ItemId, ItemNames)>);

impl<'de> Deserialize<'de> for CatalogEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = CatalogEntries;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object of item ids to names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<ItemId, ItemNames>()? {
                    entries.push(entry);
                }
                Ok(CatalogEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    by_name: HashMap<String, ItemId>,
}

impl ItemCatalog {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        // File order decides which ID keeps a shared name.
        let CatalogEntries(raw) = serde_json::from_reader(reader)?;
        Ok(Self::from_entries(raw.into_iter().filter_map(|(id, names)| {
            names.en.map(|name| (id, name))
        })))
    }

    /// Build the inverted index. Entries with a blank name are ignored; a
    /// later entry with the same normalised name replaces an earlier one.
    pub fn from_entries(entries: impl IntoIterator<Item = (ItemId, String)>) -> Self {
        let mut by_name = HashMap::new();
        for (id, name) in entries {
            let key = normalize(&name);
            if !key.is_empty() {
                by_name.insert(key, id);
            }
        }
        Self { by_name }
    }

    /// Case-insensitive, whitespace-trimmed lookup.
    pub fn resolve(&self, name: &str) -> Option<&ItemId> {
        self.by_name.get(&normalize(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "5111": { "en": "Iron Ore", "de": "Eisenerz" },
        "5380": { "en": "  Maple Log " },
        "27": { "de": "Nur Deutsch" },
        "0": { "en": "" }
    }"#;

    #[test]
    fn resolves_ignoring_case_and_padding() {
        let catalog = ItemCatalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve("iron ore").map(String::as_str), Some("5111"));
        assert_eq!(catalog.resolve("  IRON ORE\t").map(String::as_str), Some("5111"));
        assert_eq!(catalog.resolve("Maple Log").map(String::as_str), Some("5380"));
        assert_eq!(catalog.resolve("Nur Deutsch"), None);
    }

    #[test]
    fn inner_whitespace_still_matters() {
        let catalog = ItemCatalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.resolve("Iron  Ore"), None);
    }

    #[test]
    fn shared_names_go_to_the_last_entry_in_the_file() {
        let catalog = ItemCatalog::from_reader(
            r#"{ "9": { "en": "Dated Ore" }, "10": { "en": "dated ore" } }"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("Dated Ore").map(String::as_str), Some("10"));

        let reversed = ItemCatalog::from_reader(
            r#"{ "10": { "en": "Dated Ore" }, "9": { "en": "Dated Ore" } }"#.as_bytes(),
        )
        .unwrap();
        assert_eq!(reversed.resolve("Dated Ore").map(String::as_str), Some("9"));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = ItemCatalog::from_reader("[1, 2]".as_bytes()).unwrap_err();
        assert!(matches!(error, CatalogError::Json(_)));
    }
}
