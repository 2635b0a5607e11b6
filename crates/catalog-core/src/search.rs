//! Case-insensitive key search with bundle dependency chains.

use crate::graph::Catalog;
use crate::resolve::{DependencyChain, resolve_chain};
use std::fmt::Write;

/// A matching catalog key and what each of its locations loads.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub key: String,
    pub locations: Vec<LocationHit>,
}

/// One location under a matching key.
#[derive(Debug, Clone)]
pub struct LocationHit {
    pub provider_id: String,
    /// Present for bundled-asset locations whose dependencies resolve.
    pub chain: Option<DependencyChain>,
}

/// Find every text key containing `query`, ignoring case. Results follow
/// catalog order.
pub fn search(catalog: &Catalog, query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    let mut hits = Vec::new();

    for entry in catalog.entries() {
        let Some(key) = entry.key.as_text() else {
            continue;
        };
        if !key.to_lowercase().contains(&needle) {
            continue;
        }

        let locations = entry
            .locations
            .iter()
            .map(|&id| {
                let loc = catalog.location(id);
                LocationHit {
                    provider_id: loc.provider_id.clone(),
                    chain: if loc.is_bundled_asset() {
                        resolve_chain(catalog, loc)
                    } else {
                        None
                    },
                }
            })
            .collect();

        hits.push(SearchHit {
            key: key.to_string(),
            locations,
        });
    }

    tracing::debug!("search '{}' matched {} keys", query, hits.len());
    hits
}

/// Render hits as an indented listing: the key, then each provider, then the
/// primary bundle and any supplementary bundles beneath it.
pub fn format_hits(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "{}", hit.key);
        for loc in &hit.locations {
            let _ = writeln!(out, "  ({})", loc.provider_id);
            if let Some(chain) = &loc.chain {
                let _ = writeln!(out, "    {}", chain.primary);
                for extra in &chain.supplementary {
                    let _ = writeln!(out, "      {}", extra);
                }
            }
        }
    }
    out
}
