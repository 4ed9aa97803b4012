use std::fs;

use mediadex_config::{EnvSources, IndexConfig, IndexConfigSource};
use mediadex_core::sorting::{SortOrder, SortSpec, SystemSort};
use tempfile::tempdir;

const TOML_CONFIG: &str = r#"
[view]
remove_trashed_files = true

[view.default_sort]
order = "descending"

[view.default_sort.sort_type]
kind = "system"
value = "file_size"

[loader]
chunk_size = 64
shuffle = false
limit = 500

[logging]
filter = "mediadex_core=debug"
"#;

#[test]
fn loads_toml_from_configured_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("index.toml");
    fs::write(&path, TOML_CONFIG).expect("write config");

    let sources = EnvSources {
        config_path: Some(path.display().to_string()),
        ..EnvSources::default()
    };
    let (config, source) = IndexConfig::load_from_sources(&sources, dir.path()).expect("load");

    assert_eq!(source, IndexConfigSource::EnvPath(path));
    assert!(config.view.remove_trashed_files);
    assert_eq!(
        config.view.default_sort,
        SortSpec::system(SystemSort::FileSize, SortOrder::Descending)
    );
    assert_eq!(config.loader.chunk_size, 64);
    assert!(!config.loader.shuffle);
    assert_eq!(config.loader.limit, Some(500));
    assert_eq!(config.logging.filter, "mediadex_core=debug");
}

#[test]
fn inline_json_when_no_path() {
    let dir = tempdir().expect("tempdir");
    let sources = EnvSources {
        config_json: Some(r#"{"loader": {"chunk_size": 8}}"#.to_string()),
        ..EnvSources::default()
    };
    let (config, source) = IndexConfig::load_from_sources(&sources, dir.path()).expect("load");

    assert_eq!(source, IndexConfigSource::EnvInline);
    assert_eq!(config.loader.chunk_size, 8);
    assert!(config.loader.shuffle);
}

#[test]
fn falls_back_to_default_candidates_then_defaults() {
    let dir = tempdir().expect("tempdir");
    let (config, source) =
        IndexConfig::load_from_sources(&EnvSources::default(), dir.path()).expect("load");
    assert_eq!(source, IndexConfigSource::Default);
    assert_eq!(config, IndexConfig::default());

    fs::create_dir(dir.path().join("config")).expect("mkdir");
    let path = dir.path().join("config/mediadex.json");
    fs::write(&path, r#"{"view": {"remove_trashed_files": true}}"#).expect("write config");

    let (config, source) =
        IndexConfig::load_from_sources(&EnvSources::default(), dir.path()).expect("load");
    assert_eq!(source, IndexConfigSource::File(path));
    assert!(config.view.remove_trashed_files);
}

#[test]
fn boolean_override_applies_last() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("mediadex.toml");
    fs::write(&path, TOML_CONFIG).expect("write config");

    let sources = EnvSources {
        remove_trashed_files: Some("off".to_string()),
        ..EnvSources::default()
    };
    let (config, source) = IndexConfig::load_from_sources(&sources, dir.path()).expect("load");
    assert_eq!(source, IndexConfigSource::File(path));
    assert!(!config.view.remove_trashed_files);

    let sources = EnvSources {
        remove_trashed_files: Some("sometimes".to_string()),
        ..EnvSources::default()
    };
    let err = IndexConfig::load_from_sources(&sources, dir.path()).unwrap_err();
    assert!(err.to_string().contains("MEDIADEX_REMOVE_TRASHED_FILES"));
}

#[test]
fn unreadable_path_names_the_file() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    let sources = EnvSources {
        config_path: Some(missing.display().to_string()),
        ..EnvSources::default()
    };
    let err = IndexConfig::load_from_sources(&sources, dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}

#[test]
fn invalid_toml_file_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[loader]\nchunk_size = \"many\"\n").expect("write config");
    assert!(IndexConfig::load_from_file(&path).is_err());
}
