use catalog_core::export::*;
use catalog_core::graph::*;
use catalog_core::patch::neutralize_checksums;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn make_bundle(catalog: &mut Catalog, name: &str, internal_id: &str, hash: &str) -> LocationId {
    catalog.add_location(
        Location::new(name, internal_id, ASSET_BUNDLE_PROVIDER).with_data(
            LocationData::BundleRequestOptions(BundleRequestOptions::new(hash, 12345)),
        ),
    )
}

fn make_asset(catalog: &mut Catalog, key: &str, deps: Vec<LocationId>) -> LocationId {
    catalog.add_location(Location::new(key, key, BUNDLED_ASSET_PROVIDER).with_dependencies(deps))
}

#[test]
fn test_foo_png_end_to_end() {
    let mut catalog = Catalog::new();
    let l1 = make_bundle(&mut catalog, "bundle_a", "bundle_a.bundle", "abc123");
    let foo = make_asset(&mut catalog, "assets/foo.png", vec![l1]);
    catalog.insert_entry("assets/foo.png", vec![foo]);
    catalog.insert_entry("bundle_a", vec![l1]);

    let tables = export_tables(&catalog);
    assert_eq!(tables.asset_list.len(), 1);
    assert_eq!(tables.asset_list["assets/foo.png"], "bundle_a");
    assert_eq!(tables.bundle_hashes.len(), 1);
    assert_eq!(tables.bundle_hashes["0#/bundle_a"], "abc123");

    neutralize_checksums(&mut catalog);
    let opts = catalog.location(l1).bundle_options().unwrap();
    assert_eq!(opts.crc, 0);
    assert_eq!(opts.hash, "abc123");
}

#[test]
fn test_bundle_hashes_require_bundle_internal_id() {
    let mut catalog = Catalog::new();
    let prefixed = make_bundle(&mut catalog, "p", "0#/p", "hash_p");
    let remote = make_bundle(&mut catalog, "r", "https://cdn.example.com/r", "hash_r");
    catalog.insert_entry("p", vec![prefixed]);
    catalog.insert_entry("r", vec![remote]);

    let tables = export_tables(&catalog);
    assert_eq!(tables.bundle_hashes.len(), 1);
    assert!(tables.bundle_hashes.contains_key("0#/p"));
}

#[test]
fn test_bundle_hashes_use_primary_location_only() {
    let mut catalog = Catalog::new();
    let plain = catalog.add_location(Location::new("x", "x", BUNDLED_ASSET_PROVIDER));
    let bundle = make_bundle(&mut catalog, "b", "b.bundle", "hash_b");
    catalog.insert_entry("mixed", vec![plain, bundle]);
    catalog.insert_entry("empty", Vec::new());

    assert!(export_tables(&catalog).bundle_hashes.is_empty());
}

#[test]
fn test_bundle_hashes_first_wins() {
    let mut catalog = Catalog::new();
    let first = make_bundle(&mut catalog, "dup", "0#/dup.bundle", "first_hash");
    let second = make_bundle(&mut catalog, "dup", "1#/dup.bundle", "second_hash");
    catalog.insert_entry("z_first", vec![first]);
    catalog.insert_entry("a_second", vec![second]);

    let tables = export_tables(&catalog);
    assert_eq!(tables.bundle_hashes["0#/dup"], "first_hash");
}

#[test]
fn test_asset_list_key_filters() {
    let mut catalog = Catalog::new();
    let b = make_bundle(&mut catalog, "b", "b.bundle", "h");
    let no_slash = make_asset(&mut catalog, "guid0123", vec![b]);
    let bundle_key = make_asset(&mut catalog, "remote/b.bundle", vec![b]);
    let good = make_asset(&mut catalog, "Assets/Good.prefab", vec![b]);
    catalog.insert_entry("guid0123", vec![no_slash]);
    catalog.insert_entry("remote/b.bundle", vec![bundle_key]);
    catalog.insert_entry(17_i64, vec![good]);
    catalog.insert_entry("Assets/Good.prefab", vec![good]);

    let tables = export_tables(&catalog);
    assert_eq!(tables.asset_list.len(), 1);
    assert_eq!(tables.asset_list["Assets/Good.prefab"], "b");
}

#[test]
fn test_asset_list_skips_unresolvable_and_other_providers() {
    let mut catalog = Catalog::new();
    let b = make_bundle(&mut catalog, "b", "b.bundle", "h");
    let leaf = catalog.add_location(Location::new(
        "Assets/Leaf.asset",
        "Assets/Leaf.asset",
        BUNDLED_ASSET_PROVIDER,
    ));
    let scene = catalog.add_location(
        Location::new(
            "Assets/Level.unity",
            "Assets/Level.unity",
            "UnityEngine.ResourceManagement.ResourceProviders.SceneProvider",
        )
        .with_dependencies(vec![b]),
    );
    let dangling_key = catalog.add_location(
        Location::new("Assets/Gone.asset", "Assets/Gone.asset", BUNDLED_ASSET_PROVIDER)
            .with_dependency_key("missing"),
    );
    catalog.insert_entry("Assets/Leaf.asset", vec![leaf]);
    catalog.insert_entry("Assets/Level.unity", vec![scene]);
    catalog.insert_entry("Assets/Gone.asset", vec![dangling_key]);

    assert!(export_tables(&catalog).asset_list.is_empty());
}

#[test]
fn test_asset_list_redirect_schema() {
    let mut catalog = Catalog::new();
    let main = make_bundle(&mut catalog, "main", "{RuntimePath}/main.bundle", "h1");
    let shared = make_bundle(&mut catalog, "shared", "{RuntimePath}/shared.bundle", "h2");
    let x = catalog.add_location(
        Location::new("Assets/X.prefab", "Assets/X.prefab", BUNDLED_ASSET_PROVIDER)
            .with_dependency_key(3_i64),
    );
    catalog.insert_entry("Assets/X.prefab", vec![x]);
    catalog.insert_entry(3_i64, vec![main, shared]);

    let tables = export_tables(&catalog);
    assert_eq!(tables.asset_list["Assets/X.prefab"], "main");
}

#[test]
fn test_asset_list_first_wins_within_entry() {
    let mut catalog = Catalog::new();
    let b1 = make_bundle(&mut catalog, "b1", "b1.bundle", "h1");
    let b2 = make_bundle(&mut catalog, "b2", "b2.bundle", "h2");
    let via_b1 = make_asset(&mut catalog, "Assets/X.prefab", vec![b1]);
    let via_b2 = make_asset(&mut catalog, "Assets/X.prefab", vec![b2]);
    catalog.insert_entry("Assets/X.prefab", vec![via_b1, via_b2]);

    assert_eq!(export_tables(&catalog).asset_list["Assets/X.prefab"], "b1");
}

#[test]
fn test_export_is_deterministic_and_sorted() {
    let mut catalog = Catalog::new();
    for name in ["zeta", "alpha", "mid", "Beta"] {
        let b = make_bundle(&mut catalog, name, &format!("0#/{}.bundle", name), name);
        let key = format!("Assets/{}.png", name);
        let asset = make_asset(&mut catalog, &key, vec![b]);
        catalog.insert_entry(name, vec![b]);
        catalog.insert_entry(key, vec![asset]);
    }

    let first = export_tables(&catalog);
    let second = export_tables(&catalog);
    assert_eq!(
        table_to_json(&first.bundle_hashes).unwrap(),
        table_to_json(&second.bundle_hashes).unwrap()
    );
    assert_eq!(
        table_to_json(&first.asset_list).unwrap(),
        table_to_json(&second.asset_list).unwrap()
    );

    let keys: Vec<&String> = first.bundle_hashes.keys().collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(keys[0], "0#/Beta");
}

#[test]
fn test_export_paths_strip_known_extensions() {
    let (hash, list) = export_paths(Path::new("/data/catalog.json"));
    assert_eq!(hash, PathBuf::from("/data/catalog_hash.json"));
    assert_eq!(list, PathBuf::from("/data/catalog_list.json"));

    let (hash, _) = export_paths(Path::new("/data/catalog.bundle"));
    assert_eq!(hash, PathBuf::from("/data/catalog_hash.json"));

    let (hash, _) = export_paths(Path::new("/data/catalog.bin"));
    assert_eq!(hash, PathBuf::from("/data/catalog.bin_hash.json"));
}

#[test]
fn test_write_export_tables() {
    let tmp = TempDir::new().unwrap();
    let catalog_path = tmp.path().join("catalog.json");

    let mut catalog = Catalog::new();
    let b = make_bundle(&mut catalog, "キャラ", "0#/キャラ.bundle", "ff00");
    let asset = make_asset(&mut catalog, "Assets/キャラ/face.png", vec![b]);
    catalog.insert_entry("キャラ", vec![b]);
    catalog.insert_entry("Assets/キャラ/face.png", vec![asset]);

    let tables = export_tables(&catalog);
    let (hash_path, list_path) = write_export_tables(&catalog_path, &tables).unwrap();
    assert_eq!(hash_path, tmp.path().join("catalog_hash.json"));

    let hashes = std::fs::read_to_string(&hash_path).unwrap();
    assert_eq!(hashes, "{\n  \"0#/キャラ\": \"ff00\"\n}");

    let list = std::fs::read_to_string(&list_path).unwrap();
    assert!(list.contains("\"Assets/キャラ/face.png\": \"キャラ\""));
}
