use super::{run, Frontend, Synchronizer, LOCK_FILE};
use crate::config::Config;
use crate::error::Error;
use crate::marker;
use crate::render::Renderer;
use crate::store::memory::MemoryCollection;
use crate::store::json::JsonCollection;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

fn source_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".root"), "").unwrap();
    for (relative, text) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    dir
}

fn notes(root: &Path) -> PathBuf {
    root.join("a/b/notes.md")
}

#[derive(Default)]
struct RecordingFrontend {
    summaries: Vec<String>,
    refreshes: usize,
}

impl Frontend for RecordingFrontend {
    fn show_summary(&mut self, summary: &str) {
        self.summaries.push(summary.to_string());
    }

    fn refresh_decks(&mut self) {
        self.refreshes += 1;
    }
}

#[test]
fn test_single_term_becomes_one_record() {
    let tree = source_tree(&[("a/b/notes.md", "## Term\n\n**value**\n")]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.files_updated, 1);
    let record = &store.collection.records[0];
    assert_eq!(record.fields[0], "Term");
    assert_eq!(record.fields[1], "{{c1:: value}}");
    assert_eq!(store.collection.deck_name(record.deck), Some("a::b"));
    let rt = store.collection.record_type_by_id(record.record_type).unwrap();
    assert_eq!(rt.name, "Cloze (traceable)");
    assert!(rt.cloze);

    let text = fs::read_to_string(notes(tree.path())).unwrap();
    let expected = Regex::new(r"\A## Term\n\n<!-- NoteId: [0-9]{13} -->\n\n\*\*value\*\*\n\z").unwrap();
    assert!(expected.is_match(&text), "unexpected text: {text:?}");
    assert!(text.contains(&marker::marker_comment(record.id)));
}

#[test]
fn test_second_run_is_a_no_op() {
    let tree = source_tree(&[("a/b/notes.md", "## Term\n\n**value**\n\n## Other\n\n- x\n- y\n")]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let first = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();
    let after_first = fs::read(notes(tree.path())).unwrap();
    let second = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 0);
    assert_eq!(second.files_updated, 0);
    assert_eq!(store.collection.records.len(), 2);
    assert_eq!(fs::read(notes(tree.path())).unwrap(), after_first);
}

#[test]
fn test_every_converted_heading_gets_one_marker() {
    let text = "# Topic\n\n## One\n\n**a**\n\n## Two\nText with **b** and **c**.\n\n## Info\n\nnothing here\n";
    let tree = source_tree(&[("a/b/notes.md", text)]);
    let config = Config {
        trigger_levels: vec![2],
        ..Config::default()
    };
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(report.created, 2);
    let written = fs::read_to_string(notes(tree.path())).unwrap();
    let rendered = Renderer::new().unwrap().render(&written).unwrap();
    let marked: Vec<String> = rendered
        .heading_indices(|_| true)
        .filter(|index| marker::already_imported(&rendered, *index).is_some())
        .map(|index| rendered.heading(index).unwrap().label.clone())
        .collect();
    assert_eq!(marked, vec!["One", "Two"]);
    assert_eq!(written.matches("NoteId").count(), 2);
    assert_eq!(
        store.collection.records[1].fields[1],
        "Text with {{c1:: b}} and {{c2:: c}}."
    );
    assert_eq!(store.collection.records[1].fields[0], "Topic.Two");
}

#[test]
fn test_quote_without_deletions_is_left_alone() {
    let original = "## Term\n\n> extra info\n";
    let tree = source_tree(&[("a/b/notes.md", original)]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.files_scanned, 1);
    assert!(store.collection.records.is_empty());
    assert_eq!(fs::read_to_string(notes(tree.path())).unwrap(), original);
}

#[test]
fn test_shallow_files_are_not_imported() {
    let tree = source_tree(&[("a/top.md", "## Term\n\n**value**\n")]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(report.files_scanned, 0);
    assert_eq!(report.created, 0);
}

#[test]
fn test_oneside_declaration_and_marked_tag() {
    let text = "<!-- NoteType: oneside -->\n\n## ⭐ Question\n\nThe answer.\n";
    let tree = source_tree(&[("a/b/notes.md", text)]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    let record = &store.collection.records[0];
    assert_eq!(record.fields, vec!["⭐ Question", "The answer."]);
    assert_eq!(record.tags, vec!["marked"]);
}

#[test]
fn test_images_are_localized_into_the_collection() {
    let tree = source_tree(&[("a/b/notes.md", "## Term\n\n**value** ![fig](img/fig.png)\n")]);
    fs::create_dir_all(tree.path().join("a/b/img")).unwrap();
    fs::write(tree.path().join("a/b/img/fig.png"), b"png").unwrap();
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(report.assets_copied, 1);
    assert!(store.media.contains_key("a.b.fig.png"));
    assert_eq!(
        store.collection.records[0].fields[1],
        "{{c1:: value}} ![fig](a.b.fig.png)"
    );
}

#[test]
fn test_overlapping_run_is_refused() {
    let tree = source_tree(&[("a/b/notes.md", "## Term\n\n**value**\n")]);
    fs::write(tree.path().join(LOCK_FILE), "1").unwrap();
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let err = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap_err();

    assert!(matches!(err, Error::RunInProgress(_)));
    assert!(store.collection.records.is_empty());
}

#[test]
fn test_lock_is_released_after_a_run() {
    let tree = source_tree(&[]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert!(!tree.path().join(LOCK_FILE).exists());
}

#[test]
fn test_missing_sentinel_aborts() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    fs::write(dir.path().join("a/b/notes.md"), "## Term\n\n**value**\n").unwrap();
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let err = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(dir.path())
        .unwrap_err();

    assert!(matches!(err, Error::NotSourceTree { .. }));
}

#[test]
fn test_run_reports_to_frontend_and_persists() {
    let tree = source_tree(&[("a/b/notes.md", "## Term\n\n**value**\n")]);
    let collection = tempfile::tempdir().unwrap();
    let config = Config::default();
    let mut frontend = RecordingFrontend::default();

    {
        let mut store = JsonCollection::open(collection.path()).unwrap();
        run(tree.path(), &config, &mut store, &mut frontend).unwrap();
    }

    assert_eq!(frontend.summaries, vec!["1 notes imported."]);
    assert_eq!(frontend.refreshes, 1);
    let reopened = JsonCollection::open(collection.path()).unwrap();
    assert_eq!(reopened.collection().records.len(), 1);
}

#[test]
fn test_dry_run_leaves_documents_untouched() {
    let original = "## Term\n\n**value**\n";
    let tree = source_tree(&[("a/b/notes.md", original)]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let report = Synchronizer::new(&config, &mut store)
        .unwrap()
        .dry_run(true)
        .run(tree.path())
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.files_updated, 1);
    assert_eq!(fs::read_to_string(notes(tree.path())).unwrap(), original);
}

#[test]
fn test_multiline_setext_heading_is_imported_once() {
    let tree = source_tree(&[("a/b/notes.md", "Line one\nline two\n========\n\n**value**\n")]);
    let config = Config::default();
    let mut store = MemoryCollection::new();

    let first = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();
    let second = Synchronizer::new(&config, &mut store)
        .unwrap()
        .run(tree.path())
        .unwrap();

    assert_eq!(first.created, 1);
    assert_eq!(first.files_updated, 1);
    assert_eq!(second.created, 0);
    assert_eq!(store.collection.records[0].fields[1], "{{c1:: value}}");
    assert_eq!(fs::read_to_string(notes(tree.path())).unwrap().matches("NoteId").count(), 1);
}
