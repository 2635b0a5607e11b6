//! Flattened lookup tables derived from a catalog.
//!
//! Two tables are produced: bundle key → content hash, and asset key →
//! primary bundle key. Both are ordered maps so output is byte-identical
//! across runs.

use crate::error::CatalogError;
use crate::graph::Catalog;
use crate::resolve::resolve_dependencies;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix used for bundle keys in the hash table.
pub const BUNDLE_KEY_PREFIX: &str = "0#/";

/// Both export tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTables {
    /// `"0#/" + bundle primary key` → bundle content hash.
    pub bundle_hashes: BTreeMap<String, String>,
    /// Asset key → primary key of the bundle it loads from.
    pub asset_list: BTreeMap<String, String>,
}

/// Build both tables. Duplicate derived keys keep the first value seen in
/// catalog order.
pub fn export_tables(catalog: &Catalog) -> ExportTables {
    let tables = ExportTables {
        bundle_hashes: bundle_hashes(catalog),
        asset_list: asset_list(catalog),
    };
    tracing::info!(
        "exported {} bundle hashes and {} asset mappings",
        tables.bundle_hashes.len(),
        tables.asset_list.len()
    );
    tables
}

fn bundle_hashes(catalog: &Catalog) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    for entry in catalog.entries() {
        let Some(primary) = entry.primary() else {
            continue;
        };
        let loc = catalog.location(primary);
        if !loc.is_bundle_backed() {
            continue;
        }
        if let Some(opts) = loc.bundle_options() {
            table
                .entry(format!("{}{}", BUNDLE_KEY_PREFIX, loc.primary_key))
                .or_insert_with(|| opts.hash.clone());
        }
    }
    table
}

fn asset_list(catalog: &Catalog) -> BTreeMap<String, String> {
    let mut table = BTreeMap::new();
    for entry in catalog.entries() {
        let Some(key) = entry.key.as_text() else {
            continue;
        };
        if key.contains(".bundle") || !key.contains('/') {
            continue;
        }

        for &id in &entry.locations {
            let loc = catalog.location(id);
            if !loc.is_bundled_asset() {
                continue;
            }
            let Some(&first) = resolve_dependencies(catalog, loc).and_then(|deps| deps.first())
            else {
                continue;
            };
            table
                .entry(key.to_string())
                .or_insert_with(|| catalog.location(first).primary_key.clone());
        }
    }
    table
}

/// Output paths for a catalog: `.json` and `.bundle` are stripped from the
/// path, then `_hash.json` / `_list.json` are appended.
pub fn export_paths(catalog_path: &Path) -> (PathBuf, PathBuf) {
    let stem = catalog_path
        .to_string_lossy()
        .replace(".json", "")
        .replace(".bundle", "");
    (
        PathBuf::from(format!("{}_hash.json", stem)),
        PathBuf::from(format!("{}_list.json", stem)),
    )
}

/// Render a table as pretty-printed JSON.
pub fn table_to_json(table: &BTreeMap<String, String>) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(table)?)
}

/// Write both tables next to the catalog. Returns `(hash_path, list_path)`.
pub fn write_export_tables(
    catalog_path: &Path,
    tables: &ExportTables,
) -> Result<(PathBuf, PathBuf), CatalogError> {
    let (hash_path, list_path) = export_paths(catalog_path);

    // Render both before touching disk so a failure leaves nothing behind.
    let hashes = table_to_json(&tables.bundle_hashes)?;
    let list = table_to_json(&tables.asset_list)?;

    fs::write(&hash_path, hashes).map_err(|e| CatalogError::io(&hash_path, e))?;
    fs::write(&list_path, list).map_err(|e| CatalogError::io(&list_path, e))?;

    Ok((hash_path, list_path))
}
