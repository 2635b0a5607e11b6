//! CRC neutralization: zero the checksum of every bundle location so Unity
//! accepts modified bundles.

use crate::graph::{Catalog, DependencySource, LocationId, SchemaVariant};
use std::collections::HashSet;

/// Outcome of a patch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    /// Distinct locations handled by the pass, walked or patched directly.
    pub locations_visited: usize,
    /// Checksum fields set to zero (including ones that were already zero).
    pub checksums_zeroed: usize,
    pub schema: SchemaVariant,
}

/// Zero every reachable CRC in place.
///
/// Locations with embedded dependencies are walked depth-first. Asset-bundle
/// locations without an embedded list are patched directly. Either way each
/// location is handled at most once per pass. Content hashes are left alone.
pub fn neutralize_checksums(catalog: &mut Catalog) -> PatchSummary {
    let mut seen: HashSet<LocationId> = HashSet::new();
    let mut zeroed = 0;

    // Snapshot the handles; entries are not modified by the pass.
    let roots: Vec<LocationId> = catalog
        .entries()
        .iter()
        .flat_map(|entry| entry.locations.iter().copied())
        .collect();

    for id in roots {
        if matches!(
            catalog.location(id).dependencies,
            DependencySource::Embedded(_)
        ) {
            zeroed += patch_reachable(catalog, id, &mut seen);
            continue;
        }

        if seen.contains(&id) {
            continue;
        }
        let loc = catalog.location_mut(id);
        if loc.is_asset_bundle()
            && let Some(opts) = loc.bundle_options_mut()
        {
            opts.crc = 0;
            zeroed += 1;
            seen.insert(id);
        }
    }

    let summary = PatchSummary {
        locations_visited: seen.len(),
        checksums_zeroed: zeroed,
        schema: catalog.schema_variant(),
    };
    tracing::info!(
        "patched {} checksums ({} locations handled, schema: {})",
        summary.checksums_zeroed,
        summary.locations_visited,
        summary.schema
    );
    summary
}

/// Pre-order walk from `start` over embedded dependencies, skipping anything
/// already in `seen`. Returns the number of checksums zeroed.
fn patch_reachable(
    catalog: &mut Catalog,
    start: LocationId,
    seen: &mut HashSet<LocationId>,
) -> usize {
    let mut zeroed = 0;
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }

        let loc = catalog.location_mut(id);
        if let Some(opts) = loc.bundle_options_mut() {
            opts.crc = 0;
            zeroed += 1;
        }

        if let DependencySource::Embedded(deps) = &loc.dependencies {
            // Reverse so children are visited in list order.
            stack.extend(deps.iter().rev().filter(|dep| !seen.contains(*dep)));
        }
    }

    zeroed
}
