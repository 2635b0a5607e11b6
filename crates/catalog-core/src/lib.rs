//! Core engine for Addressables content catalogs.
//!
//! Provides the catalog graph model ([`graph::Catalog`]), dependency resolution
//! across old and new schema variants, CRC neutralization, export tables,
//! key search, and the codec/storage boundary for catalog files.

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod patch;
pub mod resolve;
pub mod search;
pub mod storage;

pub use error::CatalogError;
