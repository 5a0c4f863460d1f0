use super::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_from_empty_toml() {
    let config = Config::default();

    assert_eq!(config.trigger_levels, vec![1, 2, 3]);
    assert_eq!(config.min_depth, 2);
    assert_eq!(config.root_marker, ".root");
    assert_eq!(config.file_extensions, vec!["md".to_string()]);
    assert_eq!(config.default_note_type, "cloze");
    assert!(!config.flat_sections);
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "min_depth = 1\ntrigger_levels = [2]\nflat_sections = true").unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.min_depth, 1);
    assert_eq!(config.trigger_levels, vec![2]);
    assert!(config.flat_sections);
    assert_eq!(config.marked_tag, "marked");
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "min_depth = \"deep\"").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_marking_glyphs() {
    let config = Config::default();

    assert!(config.is_marked("⭐ Important"));
    assert!(config.is_marked(":star: Important"));
    assert!(!config.is_marked("Important ⭐"));
    assert!(config.triggers(3));
    assert!(!config.triggers(4));
}
