//! Dependency resolution across both catalog schema variants.
//!
//! This is the only place that branches on [`DependencySource`].

use crate::graph::{Catalog, DependencySource, Location, LocationId};

/// Resolve the ordered dependency list of a location.
///
/// Embedded lists are returned as-is; a redirect key is looked up in the
/// entry table. `None` means the location has no actionable chain.
pub fn resolve_dependencies<'a>(
    catalog: &'a Catalog,
    location: &'a Location,
) -> Option<&'a [LocationId]> {
    match &location.dependencies {
        DependencySource::Embedded(deps) => Some(deps.as_slice()),
        DependencySource::Redirect(key) => match catalog.entry(key) {
            Some(entry) => Some(entry.locations.as_slice()),
            None => {
                tracing::debug!("dependency key {} not present in catalog", key);
                None
            }
        },
        DependencySource::None => None,
    }
}

/// Internal ids along a resolved dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyChain {
    /// The bundle that is actually loaded.
    pub primary: String,
    /// Bundles loaded alongside it.
    pub supplementary: Vec<String>,
}

/// Resolve a location into its displayable chain. `None` when unresolvable
/// or when the resolved list is empty.
pub fn resolve_chain(catalog: &Catalog, location: &Location) -> Option<DependencyChain> {
    let deps = resolve_dependencies(catalog, location)?;
    let (first, rest) = deps.split_first()?;
    Some(DependencyChain {
        primary: catalog.location(*first).internal_id.clone(),
        supplementary: rest
            .iter()
            .map(|id| catalog.location(*id).internal_id.clone())
            .collect(),
    })
}
