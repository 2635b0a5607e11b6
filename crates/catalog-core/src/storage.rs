//! Read catalog files from disk and swap patched catalogs back in.

use crate::codec::{CatalogCodec, CatalogFormat, detect_format};
use crate::config::{InputConfig, PatchConfig};
use crate::error::CatalogError;
use crate::graph::Catalog;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// A catalog together with where it came from and how it was encoded.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub path: PathBuf,
    pub format: CatalogFormat,
    pub catalog: Catalog,
}

/// `path` with `suffix` appended to its file name (`catalog.json` → `catalog.json.old`).
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Check that a drag-and-drop target has one of the accepted catalog names.
pub fn check_drop_target(path: &Path, input: &InputConfig) -> Result<(), CatalogError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let accepted = input
        .drop_target_names
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(&name));
    if accepted {
        Ok(())
    } else {
        Err(CatalogError::UnsupportedDropTarget {
            name,
            expected: input.drop_target_names.join(" and "),
        })
    }
}

/// Load a catalog file, detecting its encoding from the leading bytes.
pub fn load(path: &Path, codec: &dyn CatalogCodec) -> Result<LoadedCatalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::FileNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|e| CatalogError::io(path, e))?;
    let format = detect_format(&bytes)?;
    tracing::debug!("{} detected as {} catalog", path.display(), format);

    let catalog = codec.load(&bytes, format)?;
    tracing::info!(
        "loaded {} entries / {} locations from {}",
        catalog.entry_count(),
        catalog.location_count(),
        path.display()
    );

    Ok(LoadedCatalog {
        path: path.to_path_buf(),
        format,
        catalog,
    })
}

/// Write a loaded catalog back over its original file.
///
/// The new catalog is staged next to the original, the original is renamed
/// to the backup name, then the staged file takes the original's place. If
/// staging fails the original is untouched and no staged file is left.
/// Returns the backup path.
pub fn save_patched(
    loaded: &LoadedCatalog,
    codec: &dyn CatalogCodec,
    patch: &PatchConfig,
) -> Result<PathBuf, CatalogError> {
    let path = loaded.path.as_path();
    let staged = sibling_path(path, &patch.staging_suffix);
    let backup = sibling_path(path, &patch.backup_suffix);

    if let Err(e) = stage(loaded, codec, &staged) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }

    fs::rename(path, &backup).map_err(|e| CatalogError::io(path, e))?;
    fs::rename(&staged, path).map_err(|e| CatalogError::io(&staged, e))?;

    tracing::info!(
        "replaced {} (original kept as {})",
        path.display(),
        backup.display()
    );
    Ok(backup)
}

fn stage(
    loaded: &LoadedCatalog,
    codec: &dyn CatalogCodec,
    staged: &Path,
) -> Result<(), CatalogError> {
    match loaded.format {
        CatalogFormat::Archive => {
            codec.write_back_to_archive(&loaded.catalog, &loaded.path, staged)
        }
        format => {
            let bytes = codec.serialize(&loaded.catalog, format)?;
            fs::write(staged, bytes).map_err(|e| CatalogError::io(staged, e))
        }
    }
}
