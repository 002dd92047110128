use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use tempfile::TempDir;

use super::classifier::{EventClassifier, categorize};
use super::debouncer::{DEBOUNCE, Debouncer, REBUILD_COOLDOWN};
use super::router::changes_to_messages;
use super::types::{Change, ChangeKind, FileCategory, is_temp_file};
use crate::actor::messages::BuildMsg;
use crate::config::{BuildConfig, test_project};
use crate::plugin::BuildScope;

fn make_config() -> (TempDir, BuildConfig) {
    let temp = TempDir::new().unwrap();
    let mut config = test_project(temp.path());
    let config_path = config.root.join("wasp.toml");
    fs::write(&config_path, "").unwrap();
    config.config_path = Some(config_path);
    (temp, config)
}

fn make_event(paths: Vec<&Path>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(Path::to_path_buf).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn changes(entries: &[(&PathBuf, ChangeKind)]) -> FxHashMap<PathBuf, ChangeKind> {
    entries
        .iter()
        .map(|(path, kind)| ((*path).clone(), *kind))
        .collect()
}

// =============================================================================
// Debouncer
// =============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_event_routing_by_kind() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec![Path::new("/tmp/a.rs")], create_kind()));
    debouncer.add_event(&make_event(vec![Path::new("/tmp/b.rs")], modify_kind()));
    debouncer.add_event(&make_event(vec![Path::new("/tmp/c.rs")], remove_kind()));

    assert_eq!(debouncer.pending.len(), 3);
    assert_eq!(debouncer.pending[Path::new("/tmp/a.rs")], ChangeKind::Created);
    assert_eq!(debouncer.pending[Path::new("/tmp/b.rs")], ChangeKind::Modified);
    assert_eq!(debouncer.pending[Path::new("/tmp/c.rs")], ChangeKind::Removed);
}

#[test]
fn test_metadata_and_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    let metadata = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));

    debouncer.add_event(&make_event(vec![Path::new("/tmp/a.rs")], metadata));
    debouncer.add_event(&make_event(vec![Path::new("/tmp/.a.rs.swp")], modify_kind()));
    debouncer.add_event(&make_event(vec![Path::new("/tmp/a.rs~")], modify_kind()));
    assert!(debouncer.pending.is_empty());
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new();
    let path = Path::new("/tmp/a.rs");

    debouncer.add_event(&make_event(vec![path], remove_kind()));
    debouncer.add_event(&make_event(vec![path], create_kind()));
    assert_eq!(debouncer.pending[path], ChangeKind::Created);
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::with_timing(Duration::ZERO, Duration::ZERO);
    let path = Path::new("/tmp/a.rs");

    debouncer.add_event(&make_event(vec![path], create_kind()));
    debouncer.add_event(&make_event(vec![path], remove_kind()));
    assert!(debouncer.pending.is_empty());
    assert!(!debouncer.is_ready());
    // nothing pending: no busy wake-ups
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new();
    let path = Path::new("/tmp/a.rs");

    debouncer.add_event(&make_event(vec![path], modify_kind()));
    debouncer.add_event(&make_event(vec![path], remove_kind()));
    assert_eq!(debouncer.pending[path], ChangeKind::Removed);
}

#[test]
fn test_sleep_duration_after_event() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec![Path::new("/tmp/a.rs")], modify_kind()));

    let dur = debouncer.sleep_duration();
    assert!(dur <= DEBOUNCE);
    assert!(dur >= DEBOUNCE - Duration::from_millis(50));
}

#[test]
fn test_take_if_ready_respects_cooldown() {
    let mut debouncer = Debouncer::with_timing(Duration::ZERO, REBUILD_COOLDOWN);
    debouncer.add_event(&make_event(vec![Path::new("/tmp/a.rs")], modify_kind()));

    let first = debouncer.take_if_ready().unwrap();
    assert_eq!(first.len(), 1);

    debouncer.add_event(&make_event(vec![Path::new("/tmp/b.rs")], modify_kind()));
    assert!(debouncer.take_if_ready().is_none());
    assert!(debouncer.sleep_duration() > REBUILD_COOLDOWN - Duration::from_millis(100));
}

#[test]
fn test_is_temp_file() {
    assert!(is_temp_file(Path::new("/a/.index.js.swp")));
    assert!(is_temp_file(Path::new("/a/#lib.rs#")));
    assert!(is_temp_file(Path::new("/a/lib.rs~")));
    assert!(is_temp_file(Path::new("/a/lib.rs.bak")));
    assert!(!is_temp_file(Path::new("/a/lib.rs")));
}

// =============================================================================
// Classifier
// =============================================================================

#[test]
fn test_categorize() {
    let (_tmp, config) = make_config();
    let root = config.root.clone();

    assert_eq!(categorize(&root.join("wasp.toml"), &config), FileCategory::Config);
    assert_eq!(categorize(&root.join("index.js"), &config), FileCategory::Web);
    assert_eq!(categorize(&root.join("index.html"), &config), FileCategory::Web);
    assert_eq!(categorize(&root.join("Cargo.toml"), &config), FileCategory::Crate);
    assert_eq!(categorize(&root.join("src/lib.rs"), &config), FileCategory::Crate);
    assert_eq!(categorize(&root.join("src/a/b.rs"), &config), FileCategory::Crate);
    assert_eq!(categorize(&root.join("README.md"), &config), FileCategory::Unrelated);
    assert_eq!(categorize(&root.join("dist/index.js"), &config), FileCategory::Unrelated);
}

#[test]
fn test_categorize_without_wasm() {
    let (_tmp, mut config) = make_config();
    config.wasm.enable = false;
    let root = config.root.clone();

    assert_eq!(categorize(&root.join("src/lib.rs"), &config), FileCategory::Unrelated);
    assert_eq!(categorize(&root.join("index.js"), &config), FileCategory::Web);
}

#[test]
fn test_classify_drops_unrelated() {
    let (_tmp, config) = make_config();
    let readme = config.root.join("README.md");
    fs::write(&readme, "hi").unwrap();
    let lib = config.root.join("src/lib.rs");
    fs::write(&lib, "pub fn a() {}").unwrap();

    let mut classifier = EventClassifier::new(&config);
    let result = classifier.classify(
        changes(&[(&readme, ChangeKind::Modified), (&lib, ChangeKind::Modified)]),
        &config,
    );
    assert_eq!(
        result,
        [Change {
            path: lib,
            kind: ChangeKind::Modified,
            category: FileCategory::Crate,
        }]
    );
}

#[test]
fn test_classify_corrects_by_existence() {
    let (_tmp, config) = make_config();
    let lib = config.root.join("src/lib.rs");
    let gone = config.root.join("src/gone.rs");

    let mut classifier = EventClassifier::new(&config);
    let result = classifier.classify(
        changes(&[(&lib, ChangeKind::Removed), (&gone, ChangeKind::Created)]),
        &config,
    );
    // atomic save: reported removed but present again
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].path, lib);
    assert_eq!(result[0].kind, ChangeKind::Modified);
}

#[test]
fn test_classify_skips_unchanged_content() {
    let (_tmp, config) = make_config();
    let entry = config.entry.clone();
    let mut classifier = EventClassifier::new(&config);

    // touched without edits
    let result = classifier.classify(changes(&[(&entry, ChangeKind::Modified)]), &config);
    assert!(result.is_empty());

    fs::write(&entry, "console.log(1);\n").unwrap();
    let result = classifier.classify(changes(&[(&entry, ChangeKind::Modified)]), &config);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].category, FileCategory::Web);
}

#[test]
fn test_classify_ignores_directories() {
    let (_tmp, config) = make_config();
    let module_dir = config.root.join("src/render");
    fs::create_dir_all(&module_dir).unwrap();

    let mut classifier = EventClassifier::new(&config);
    let result = classifier.classify(changes(&[(&module_dir, ChangeKind::Created)]), &config);
    assert!(result.is_empty());
}

// =============================================================================
// Router
// =============================================================================

fn change(path: &str, category: FileCategory) -> Change {
    Change {
        path: PathBuf::from(path),
        kind: ChangeKind::Modified,
        category,
    }
}

#[test]
fn test_web_change_restages() {
    let messages = changes_to_messages(vec![change("/app/index.js", FileCategory::Web)]);
    assert!(matches!(
        messages.as_slice(),
        [BuildMsg::Rebuild { scope: BuildScope::Restage, changed }] if changed.len() == 1
    ));
}

#[test]
fn test_crate_change_wins_over_web() {
    let messages = changes_to_messages(vec![
        change("/app/index.js", FileCategory::Web),
        change("/app/src/lib.rs", FileCategory::Crate),
    ]);
    assert!(matches!(
        messages.as_slice(),
        [BuildMsg::Rebuild { scope: BuildScope::Full, changed }] if changed.len() == 2
    ));
}

#[test]
fn test_config_change_does_not_rebuild() {
    let messages = changes_to_messages(vec![change("/app/wasp.toml", FileCategory::Config)]);
    assert!(matches!(messages.as_slice(), [BuildMsg::ConfigChanged(_)]));
}
