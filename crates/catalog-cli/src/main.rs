//! CLI binary for catalog-tool: search, CRC-patch, and extract Addressables catalogs.

use anyhow::{Context, Result};
use catalog_core::CatalogError;
use catalog_core::codec::NativeCodec;
use catalog_core::config::ToolConfig;
use catalog_core::storage::LoadedCatalog;
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "catalog-tool",
    about = "Search, CRC-patch, and extract Addressables content catalogs",
    override_usage = "catalog-tool <CATALOG>\n       catalog-tool <MODE> <CATALOG> [--query <QUERY>]"
)]
struct Cli {
    /// Mode (search, patch, extract), or a catalog file to patch directly
    #[arg(value_name = "MODE|CATALOG")]
    target: String,

    /// Catalog file (catalog.json, catalog.bin, or a catalog bundle)
    catalog: Option<PathBuf>,

    /// Search query (prompted for on stdin when omitted)
    #[arg(short, long)]
    query: Option<String>,
}

/// What to do with a loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Search,
    Patch,
    Extract,
}

impl FromStr for Mode {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "patch" => Ok(Self::Patch),
            "extract" => Ok(Self::Extract),
            other => Err(CatalogError::UnsupportedMode(other.to_string())),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.catalog {
        // Drag-and-drop: a lone catalog path is always patched.
        None => {
            let path = PathBuf::from(&cli.target);
            let config = load_config(&path)?;
            if !path.is_file() {
                return Err(CatalogError::FileNotFound(path).into());
            }
            catalog_core::storage::check_drop_target(&path, &config.input)?;
            let loaded = load_catalog(&path, &config)?;
            cmd_patch(loaded, &config)
        }
        Some(path) => {
            let mode: Mode = cli.target.parse()?;
            let config = load_config(&path)?;
            let loaded = load_catalog(&path, &config)?;
            match mode {
                Mode::Search => cmd_search(&loaded, cli.query.as_deref()),
                Mode::Patch => cmd_patch(loaded, &config),
                Mode::Extract => cmd_extract(&loaded),
            }
        }
    }
}

/// Load `catalog-tool.toml` from the catalog's directory.
fn load_config(catalog_path: &Path) -> Result<ToolConfig> {
    let dir = catalog_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ToolConfig::load(dir).with_context(|| format!("invalid config in {}", dir.display()))
}

fn load_catalog(path: &Path, config: &ToolConfig) -> Result<LoadedCatalog> {
    let codec = NativeCodec::new(config.storage.compression_level);
    Ok(catalog_core::storage::load(path, &codec)?)
}

fn cmd_search(loaded: &LoadedCatalog, query: Option<&str>) -> Result<()> {
    let query = match query {
        Some(q) => q.to_string(),
        None => {
            print!("search key to find bundles of: ");
            std::io::stdout().flush().ok();
            let mut line = String::new();
            if std::io::stdin().lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let hits = catalog_core::search::search(&loaded.catalog, &query);
    if hits.is_empty() {
        println!("No keys found for: {}", query);
        return Ok(());
    }

    print!("{}", catalog_core::search::format_hits(&hits));
    Ok(())
}

fn cmd_patch(mut loaded: LoadedCatalog, config: &ToolConfig) -> Result<()> {
    eprintln!("patching...");
    let summary = catalog_core::patch::neutralize_checksums(&mut loaded.catalog);

    let codec = NativeCodec::new(config.storage.compression_level);
    let backup = catalog_core::storage::save_patched(&loaded, &codec, &config.patch)
        .with_context(|| format!("failed to write patched {}", loaded.path.display()))?;

    eprintln!("  Schema: {}", summary.schema);
    eprintln!("  Checksums zeroed: {}", summary.checksums_zeroed);
    eprintln!("  Original saved to: {}", backup.display());
    Ok(())
}

fn cmd_extract(loaded: &LoadedCatalog) -> Result<()> {
    let tables = catalog_core::export::export_tables(&loaded.catalog);
    let (hash_path, list_path) =
        catalog_core::export::write_export_tables(&loaded.path, &tables)?;

    println!("{}", tables.bundle_hashes.len());
    println!("{}", tables.asset_list.len());
    eprintln!("  Bundle hashes: {}", hash_path.display());
    eprintln!("  Asset list: {}", list_path.display());
    Ok(())
}
