use serde::{Deserialize, Serialize};

use crate::error::{Result, TilingError};

/// Built-in sizes in centimeters, in the order they are offered to users.
const DEFAULT_SIZES: [(&str, f64, f64); 8] = [
    ("10x10", 10.0, 10.0),
    ("15x15", 15.0, 15.0),
    ("10x30", 10.0, 30.0),
    ("30x30", 30.0, 30.0),
    ("30x60", 30.0, 60.0),
    ("60x60", 60.0, 60.0),
    ("45x90", 45.0, 90.0),
    ("90x90", 90.0, 90.0),
];

/// Width and height of one tile, as stored in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSize {
    pub width: f64,
    pub height: f64,
}

impl TileSize {
    pub fn new(width: f64, height: f64) -> Self {
        TileSize { width, height }
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// The same tile turned by 90 degrees.
    pub fn rotated(&self) -> Self {
        TileSize {
            width: self.height,
            height: self.width,
        }
    }
}

/// One catalog line as it appears in a JSON catalog file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeEntry {
    pub key: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    sizes: Vec<SizeEntry>,
}

/// Immutable set of named tile sizes.
///
/// Built once (either the defaults or from a JSON file) and then shared by
/// reference; nothing mutates it afterwards, so concurrent readers need no
/// synchronization.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    entries: Vec<SizeEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog {
            entries: DEFAULT_SIZES
                .iter()
                .map(|&(key, width, height)| SizeEntry {
                    key: key.to_string(),
                    width,
                    height,
                })
                .collect(),
        }
    }
}

impl Catalog {
    /// Build a catalog from entries, keeping their order.
    ///
    /// Rejects repeated keys and sizes that are not strictly positive.
    pub fn new(entries: Vec<SizeEntry>) -> Result<Self> {
        for (i, e) in entries.iter().enumerate() {
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(e.width) || !valid(e.height) {
                return Err(TilingError::InvalidTileSize {
                    key: e.key.clone(),
                    width: e.width,
                    height: e.height,
                });
            }
            if entries[..i].iter().any(|prev| prev.key == e.key) {
                return Err(TilingError::DuplicateSize(e.key.clone()));
            }
        }
        Ok(Catalog { entries })
    }

    /// Parse `{ "sizes": [ { "key": .., "width": .., "height": .. } ] }`.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(text)
            .map_err(|e| TilingError::MalformedCatalog(e.to_string()))?;
        Self::new(file.sizes)
    }

    pub fn to_json(&self) -> String {
        let file = CatalogFile {
            sizes: self.entries.clone(),
        };
        serde_json::to_string_pretty(&file).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<TileSize> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| TileSize::new(e.width, e.height))
    }

    /// Resolve a size key, failing with [`TilingError::InvalidSizeKey`].
    pub fn lookup(&self, key: &str) -> Result<TileSize> {
        self.get(key)
            .ok_or_else(|| TilingError::InvalidSizeKey(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Keys in catalog order, for populating a selection list.
    pub fn list_keys(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, width: f64, height: f64) -> SizeEntry {
        SizeEntry {
            key: key.to_string(),
            width,
            height,
        }
    }

    #[test]
    fn default_catalog_keeps_insertion_order() {
        let catalog = Catalog::default();
        assert_eq!(
            catalog.list_keys(),
            vec!["10x10", "15x15", "10x30", "30x30", "30x60", "60x60", "45x90", "90x90"]
        );
    }

    #[test]
    fn lookup_resolves_known_key() {
        let catalog = Catalog::default();
        assert_eq!(catalog.lookup("45x90"), Ok(TileSize::new(45.0, 90.0)));
    }

    #[test]
    fn lookup_unknown_key_names_it() {
        let err = Catalog::default().lookup("99x99").unwrap_err();
        assert_eq!(err, TilingError::InvalidSizeKey("99x99".to_string()));
        assert_eq!(err.to_string(), "invalid tile size `99x99`");
    }

    #[test]
    fn json_catalog_round_trips_entries() {
        let catalog = Catalog::from_json(
            r#"{"sizes":[{"key":"20x40","width":20,"height":40},{"key":"5x5","width":5,"height":5}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.list_keys(), vec!["20x40", "5x5"]);
        assert_eq!(Catalog::from_json(&catalog.to_json()).unwrap(), catalog);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = Catalog::new(vec![entry("a", 1.0, 1.0), entry("a", 2.0, 2.0)]).unwrap_err();
        assert_eq!(err, TilingError::DuplicateSize("a".to_string()));
    }

    #[test]
    fn rejects_non_positive_sizes() {
        assert!(matches!(
            Catalog::new(vec![entry("flat", 10.0, 0.0)]),
            Err(TilingError::InvalidTileSize { .. })
        ));
        assert!(matches!(
            Catalog::new(vec![entry("nan", f64::NAN, 1.0)]),
            Err(TilingError::InvalidTileSize { .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            Catalog::from_json("{\"sizes\": 3}"),
            Err(TilingError::MalformedCatalog(_))
        ));
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let t = TileSize::new(30.0, 60.0);
        assert!(!t.is_square());
        assert_eq!(t.rotated(), TileSize::new(60.0, 30.0));
        assert!(TileSize::new(15.0, 15.0).is_square());
    }
}
