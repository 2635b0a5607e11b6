//! Graph data model for an Addressables content catalog.
//!
//! Locations live in an arena and are referenced by [`LocationId`], so two
//! structurally identical locations stay distinct nodes. Entries map a
//! [`ResourceKey`] to an ordered list of location handles; entry order is the
//! catalog's original order.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Provider that loads an asset out of an already-loaded bundle.
pub const BUNDLED_ASSET_PROVIDER: &str =
    "UnityEngine.ResourceManagement.ResourceProviders.BundledAssetProvider";

/// Provider that loads an asset bundle file.
pub const ASSET_BUNDLE_PROVIDER: &str =
    "UnityEngine.ResourceManagement.ResourceProviders.AssetBundleProvider";

/// Current catalog document version.
pub const CATALOG_VERSION: &str = "1.0.0";

/// The complete catalog: a location arena plus the keyed entry table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    /// Optional locator id carried through from the source catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator_id: Option<String>,
    locations: Vec<Location>,
    entries: Vec<Entry>,
    /// Lookup index: key → position in `entries`.
    /// Rebuilt on load and after entry mutations via `rebuild_index()`.
    #[serde(skip)]
    entry_index: HashMap<ResourceKey, usize>,
}

/// Handle to a location in the catalog arena. Identity, not value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub usize);

/// A catalog key. Most keys are asset paths or GUIDs; some catalogs also
/// carry numeric keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceKey {
    Text(String),
    Integer(i64),
}

impl ResourceKey {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ResourceKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ResourceKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ResourceKey {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// One keyed row of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub key: ResourceKey,
    /// Candidate locations. Index 0 is the primary location.
    pub locations: Vec<LocationId>,
}

impl Entry {
    pub fn primary(&self) -> Option<LocationId> {
        self.locations.first().copied()
    }
}

/// One resolvable resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub primary_key: String,
    pub internal_id: String,
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "DependencySource::is_none")]
    pub dependencies: DependencySource,
    #[serde(default, skip_serializing_if = "LocationData::is_none")]
    pub data: LocationData,
}

/// How a location names its dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencySource {
    /// New schema: the dependency list is embedded in the location.
    Embedded(Vec<LocationId>),
    /// Old schema: the dependency list is the entry stored under this key.
    Redirect(ResourceKey),
    #[default]
    None,
}

impl DependencySource {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Per-location metadata payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationData {
    /// Checksum-bearing asset bundle request options.
    BundleRequestOptions(BundleRequestOptions),
    /// Any other serialized object, kept verbatim.
    Other(serde_json::Value),
    #[default]
    None,
}

impl LocationData {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Asset bundle request options attached to bundle locations.
///
/// `crc` is the integrity checksum Unity verifies on load; `hash` identifies
/// the bundle content and is never rewritten.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleRequestOptions {
    pub hash: String,
    pub crc: u32,
    pub timeout: i32,
    pub chunked_transfer: bool,
    pub redirect_limit: i32,
    pub retry_count: i32,
    pub bundle_name: String,
    pub bundle_size: i64,
    pub use_crc_for_cached_bundles: bool,
    pub use_uwr_for_local_bundles: bool,
    pub clear_other_cached_versions: bool,
}

impl BundleRequestOptions {
    pub fn new(hash: impl Into<String>, crc: u32) -> Self {
        Self {
            hash: hash.into(),
            crc,
            redirect_limit: -1,
            ..Self::default()
        }
    }
}

/// Which dependency encoding a catalog uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Dependencies embedded in locations.
    Embedded,
    /// Dependencies reached through a dependency key.
    Redirect,
    /// Both encodings present.
    Mixed,
    /// No location declares dependencies.
    Flat,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Embedded => "embedded (new)",
            Self::Redirect => "redirect (old)",
            Self::Mixed => "mixed",
            Self::Flat => "flat",
        };
        f.write_str(name)
    }
}

impl Location {
    pub fn new(
        primary_key: impl Into<String>,
        internal_id: impl Into<String>,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            primary_key: primary_key.into(),
            internal_id: internal_id.into(),
            provider_id: provider_id.into(),
            dependencies: DependencySource::None,
            data: LocationData::None,
        }
    }

    pub fn with_dependencies(mut self, deps: Vec<LocationId>) -> Self {
        self.dependencies = DependencySource::Embedded(deps);
        self
    }

    pub fn with_dependency_key(mut self, key: impl Into<ResourceKey>) -> Self {
        self.dependencies = DependencySource::Redirect(key.into());
        self
    }

    pub fn with_data(mut self, data: LocationData) -> Self {
        self.data = data;
        self
    }

    pub fn is_bundled_asset(&self) -> bool {
        self.provider_id == BUNDLED_ASSET_PROVIDER
    }

    pub fn is_asset_bundle(&self) -> bool {
        self.provider_id == ASSET_BUNDLE_PROVIDER
    }

    /// Whether the internal id names a bundle file (`0#` prefixed or `.bundle`).
    pub fn is_bundle_backed(&self) -> bool {
        self.internal_id.starts_with("0#") || self.internal_id.contains(".bundle")
    }

    pub fn bundle_options(&self) -> Option<&BundleRequestOptions> {
        match &self.data {
            LocationData::BundleRequestOptions(opts) => Some(opts),
            _ => None,
        }
    }

    pub fn bundle_options_mut(&mut self) -> Option<&mut BundleRequestOptions> {
        match &mut self.data {
            LocationData::BundleRequestOptions(opts) => Some(opts),
            _ => None,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog at the current document version.
    pub fn new() -> Self {
        Self {
            version: CATALOG_VERSION.to_string(),
            locator_id: None,
            locations: Vec::new(),
            entries: Vec::new(),
            entry_index: HashMap::new(),
        }
    }

    /// Append a location to the arena and return its handle.
    pub fn add_location(&mut self, location: Location) -> LocationId {
        self.locations.push(location);
        LocationId(self.locations.len() - 1)
    }

    /// Insert an entry. An existing key keeps its position and gets the new list.
    pub fn insert_entry(&mut self, key: impl Into<ResourceKey>, locations: Vec<LocationId>) {
        let key = key.into();
        if let Some(&idx) = self.entry_index.get(&key) {
            self.entries[idx].locations = locations;
            return;
        }
        self.entry_index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, locations });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, key: &ResourceKey) -> Option<&Entry> {
        self.entry_index.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.0]
    }

    pub fn location_mut(&mut self, id: LocationId) -> &mut Location {
        &mut self.locations[id.0]
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations
            .iter()
            .enumerate()
            .map(|(i, loc)| (LocationId(i), loc))
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Rebuild the key index from the entry list. Later duplicates of a key
    /// are shadowed by the first occurrence.
    pub fn rebuild_index(&mut self) {
        self.entry_index.clear();
        for (idx, entry) in self.entries.iter().enumerate() {
            self.entry_index.entry(entry.key.clone()).or_insert(idx);
        }
    }

    /// Verify every stored handle points into the arena.
    pub fn check_references(&self) -> Result<(), CatalogError> {
        let len = self.locations.len();
        let check = |id: &LocationId| {
            if id.0 < len {
                Ok(())
            } else {
                Err(CatalogError::DanglingLocation { id: id.0, len })
            }
        };
        for entry in &self.entries {
            entry.locations.iter().try_for_each(check)?;
        }
        for loc in &self.locations {
            if let DependencySource::Embedded(deps) = &loc.dependencies {
                deps.iter().try_for_each(check)?;
            }
        }
        Ok(())
    }

    /// Classify the dependency encoding used across the catalog.
    pub fn schema_variant(&self) -> SchemaVariant {
        let mut embedded = false;
        let mut redirect = false;
        for loc in &self.locations {
            match loc.dependencies {
                DependencySource::Embedded(_) => embedded = true,
                DependencySource::Redirect(_) => redirect = true,
                DependencySource::None => {}
            }
        }
        match (embedded, redirect) {
            (true, false) => SchemaVariant::Embedded,
            (false, true) => SchemaVariant::Redirect,
            (true, true) => SchemaVariant::Mixed,
            (false, false) => SchemaVariant::Flat,
        }
    }
}
