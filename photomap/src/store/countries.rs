//! Country record table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::location::LocationStore;
use crate::geocode::CountryCode;

/// Display information and derived totals for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub code: CountryCode,
    /// Display name; empty until an authority answer supplies one.
    #[serde(default)]
    pub name: String,
    /// Derived from the store at flush time.
    #[serde(default)]
    pub markers: usize,
    /// Derived from the store at flush time.
    #[serde(default)]
    pub photos: usize,
}

impl CountryRecord {
    fn new(code: CountryCode) -> Self {
        Self {
            code,
            name: String::new(),
            markers: 0,
            photos: 0,
        }
    }
}

/// Every country the map has seen, keyed by code.
///
/// The unresolved code never appears here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CountryRecord>", into = "Vec<CountryRecord>")]
pub struct CountryTable {
    records: BTreeMap<CountryCode, CountryRecord>,
}

impl CountryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `code` is in use, filling in its name if still unknown.
    ///
    /// Returns true if the table changed.
    pub fn register(&mut self, code: &CountryCode, name: Option<&str>) -> bool {
        if code.is_unresolved() {
            return false;
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        match self.records.get_mut(code) {
            Some(record) => match name {
                Some(name) if record.name.is_empty() => {
                    record.name = name.to_string();
                    true
                }
                _ => false,
            },
            None => {
                let mut record = CountryRecord::new(code.clone());
                if let Some(name) = name {
                    record.name = name.to_string();
                }
                self.records.insert(code.clone(), record);
                true
            }
        }
    }

    /// Replace every record's counts with totals derived from `store`.
    ///
    /// Codes present in the store but missing here are added without a
    /// name; codes no longer in the store keep their record with zero counts.
    pub fn refresh_counts(&mut self, store: &LocationStore) {
        let aggregates = store.recompute_aggregates();

        for record in self.records.values_mut() {
            record.markers = 0;
            record.photos = 0;
        }
        for (code, aggregate) in aggregates {
            if code.is_unresolved() {
                continue;
            }
            let record = self
                .records
                .entry(code.clone())
                .or_insert_with(|| CountryRecord::new(code));
            record.markers = aggregate.markers;
            record.photos = aggregate.photos;
        }
    }

    /// Record for `code`.
    pub fn get(&self, code: &CountryCode) -> Option<&CountryRecord> {
        self.records.get(code)
    }

    /// Records in code order.
    pub fn iter(&self) -> impl Iterator<Item = &CountryRecord> {
        self.records.values()
    }

    /// Number of known countries.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no country is known.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Countries currently holding at least one marker.
    pub fn populated_count(&self) -> usize {
        self.records.values().filter(|r| r.markers > 0).count()
    }
}

impl From<Vec<CountryRecord>> for CountryTable {
    fn from(records: Vec<CountryRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .filter(|r| !r.code.is_unresolved())
                .map(|r| (r.code.clone(), r))
                .collect(),
        }
    }
}

impl From<CountryTable> for Vec<CountryRecord> {
    fn from(table: CountryTable) -> Self {
        table.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::marker::{Marker, PhotoRef};

    fn code(raw: &str) -> CountryCode {
        CountryCode::new(raw)
    }

    #[test]
    fn test_register_backfills_missing_name() {
        let mut table = CountryTable::new();

        assert!(table.register(&code("FR"), None));
        assert_eq!(table.get(&code("FR")).unwrap().name, "");

        assert!(table.register(&code("FR"), Some("France")));
        assert_eq!(table.get(&code("FR")).unwrap().name, "France");

        // First name wins
        assert!(!table.register(&code("FR"), Some("République française")));
        assert_eq!(table.get(&code("FR")).unwrap().name, "France");
    }

    #[test]
    fn test_register_ignores_unresolved_and_blank_names() {
        let mut table = CountryTable::new();

        assert!(!table.register(&CountryCode::unresolved(), Some("Nowhere")));
        assert!(table.is_empty());

        table.register(&code("DE"), Some("   "));
        assert_eq!(table.get(&code("DE")).unwrap().name, "");
    }

    #[test]
    fn test_refresh_counts_from_store() {
        let mut store = LocationStore::new();
        let paris = Coordinate::new(2.35, 48.85).unwrap();
        let sea = Coordinate::new(-30.0, 0.5).unwrap();
        store.insert_marker(
            code("FR"),
            Marker::with_photos(paris, [PhotoRef::new("1", "a"), PhotoRef::new("2", "b")]),
        );
        store.insert_marker(
            CountryCode::unresolved(),
            Marker::with_photos(sea, [PhotoRef::new("3", "c")]),
        );

        let mut table = CountryTable::new();
        table.register(&code("IT"), Some("Italy"));
        table.refresh_counts(&store);

        let fr = table.get(&code("FR")).unwrap();
        assert_eq!((fr.markers, fr.photos), (1, 2));
        let it = table.get(&code("IT")).unwrap();
        assert_eq!((it.markers, it.photos), (0, 0));
        assert!(table.get(&CountryCode::unresolved()).is_none());
        assert_eq!(table.populated_count(), 1);
    }

    #[test]
    fn test_serializes_as_record_list() {
        let mut table = CountryTable::new();
        table.register(&code("US"), Some("United States"));
        table.register(&code("FR"), Some("France"));

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["code"], "FR");
        assert_eq!(json[1]["name"], "United States");

        let back: CountryTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
