//! Catalog encodings and the codec boundary.
//!
//! Three on-disk shapes are recognised by their leading bytes: a JSON
//! document, a packed (zstd-compressed) document, and a UnityFS archive that
//! wraps a catalog. [`NativeCodec`] reads and writes the first two.

use crate::error::CatalogError;
use crate::graph::{CATALOG_VERSION, Catalog};
use std::fmt;
use std::path::Path;

const UNITY_FS_MAGIC: &[u8] = b"UnityFS";
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Encoding of a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Binary,
    Archive,
}

impl fmt::Display for CatalogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Binary => "binary",
            Self::Archive => "archive",
        };
        f.write_str(name)
    }
}

/// Classify raw catalog bytes.
pub fn detect_format(bytes: &[u8]) -> Result<CatalogFormat, CatalogError> {
    if bytes.starts_with(UNITY_FS_MAGIC) {
        return Ok(CatalogFormat::Archive);
    }
    if bytes.starts_with(&ZSTD_MAGIC) {
        return Ok(CatalogFormat::Binary);
    }
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(&b'{') => Ok(CatalogFormat::Json),
        _ => Err(CatalogError::UnrecognizedFormat),
    }
}

/// Boundary between the catalog engine and concrete file encodings.
pub trait CatalogCodec {
    /// Decode a catalog that was classified as `format`.
    fn load(&self, bytes: &[u8], format: CatalogFormat) -> Result<Catalog, CatalogError>;

    /// Encode a catalog for writing back in `format`.
    fn serialize(
        &self,
        catalog: &Catalog,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, CatalogError>;

    /// Replace the catalog inside the archive at `original`, writing the
    /// result to `output`. Other archive contents stay untouched.
    fn write_back_to_archive(
        &self,
        catalog: &Catalog,
        original: &Path,
        output: &Path,
    ) -> Result<(), CatalogError>;
}

/// Codec for JSON and packed catalog documents.
#[derive(Debug, Clone)]
pub struct NativeCodec {
    compression_level: i32,
}

impl Default for NativeCodec {
    fn default() -> Self {
        Self::new(3)
    }
}

impl NativeCodec {
    pub fn new(compression_level: i32) -> Self {
        Self { compression_level }
    }
}

impl CatalogCodec for NativeCodec {
    fn load(&self, bytes: &[u8], format: CatalogFormat) -> Result<Catalog, CatalogError> {
        match format {
            CatalogFormat::Json => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                from_json(body)
            }
            CatalogFormat::Binary => {
                let json = zstd::decode_all(bytes).map_err(CatalogError::Packed)?;
                from_json(&json)
            }
            CatalogFormat::Archive => Err(CatalogError::ArchiveUnsupported),
        }
    }

    fn serialize(
        &self,
        catalog: &Catalog,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, CatalogError> {
        match format {
            CatalogFormat::Json => Ok(to_json(catalog)?.into_bytes()),
            CatalogFormat::Binary => {
                let json = serde_json::to_vec(catalog)?;
                zstd::encode_all(json.as_slice(), self.compression_level)
                    .map_err(CatalogError::Packed)
            }
            CatalogFormat::Archive => Err(CatalogError::ArchiveUnsupported),
        }
    }

    fn write_back_to_archive(
        &self,
        _catalog: &Catalog,
        _original: &Path,
        _output: &Path,
    ) -> Result<(), CatalogError> {
        Err(CatalogError::ArchiveUnsupported)
    }
}

/// Validate a catalog's document version.
pub fn validate_version(catalog: &Catalog) -> Result<(), CatalogError> {
    if catalog.version != CATALOG_VERSION {
        return Err(CatalogError::VersionMismatch {
            expected: CATALOG_VERSION.to_string(),
            found: catalog.version.clone(),
        });
    }
    Ok(())
}

/// Serialize a catalog to a pretty-printed JSON string.
pub fn to_json(catalog: &Catalog) -> Result<String, CatalogError> {
    Ok(serde_json::to_string_pretty(catalog)?)
}

/// Deserialize and check a catalog from JSON bytes.
pub fn from_json(bytes: &[u8]) -> Result<Catalog, CatalogError> {
    let mut catalog: Catalog = serde_json::from_slice(bytes)?;
    validate_version(&catalog)?;
    catalog.check_references()?;
    catalog.rebuild_index();
    Ok(catalog)
}
