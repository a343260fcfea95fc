use launch_panel::backup::BACKUP_PREFIX;
use launch_panel::config::{ConfigStore, LaunchItem, DEFAULT_ICON};
use tempfile::tempdir;

#[test]
fn export_writes_current_document_to_arbitrary_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::load(&path);
    assert!(store.add_category("Tools"));
    assert!(store.add_item("Tools", LaunchItem::new("Calc", "calc.exe")));

    let export = dir.path().join("exported.json");
    assert!(store.export_config(&export));

    let roundtrip = ConfigStore::load(&export);
    let tools = roundtrip.category("Tools").unwrap();
    assert_eq!(tools.items[0].name, "Calc");
}

#[test]
fn export_to_unwritable_path_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::load(&path);
    assert!(!store.export_config(dir.path().join("no_such_dir").join("out.json")));
}

#[test]
fn import_without_categories_key_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::load(&path);
    assert!(store.add_category("Tools"));
    let memory_before: Vec<String> =
        store.categories().iter().map(|c| c.name.clone()).collect();
    let disk_before = std::fs::read_to_string(&path).unwrap();

    let import = dir.path().join("import.json");
    std::fs::write(&import, r#"{"something": []}"#).unwrap();
    assert!(!store.import_config(&import));

    let memory_after: Vec<String> =
        store.categories().iter().map(|c| c.name.clone()).collect();
    assert_eq!(memory_before, memory_after);
    assert_eq!(disk_before, std::fs::read_to_string(&path).unwrap());
}

#[test]
fn import_of_invalid_json_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::load(&path);
    let disk_before = std::fs::read_to_string(&path).unwrap();

    let import = dir.path().join("import.json");
    std::fs::write(&import, "not json at all").unwrap();
    assert!(!store.import_config(&import));
    std::fs::write(&import, r#"["a", "b"]"#).unwrap();
    assert!(!store.import_config(&import));

    assert_eq!(disk_before, std::fs::read_to_string(&path).unwrap());
}

#[test]
fn import_of_missing_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut store = ConfigStore::load(&path);
    assert!(!store.import_config(dir.path().join("absent.json")));
}

#[test]
fn import_replaces_state_and_snapshots_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::load(&path);
    assert!(store.add_category("Old"));

    let import = dir.path().join("import.json");
    std::fs::write(
        &import,
        r#"{"categories": [{"name": "New", "items": [{"name": "Calc", "path": "calc.exe"}]}]}"#,
    )
    .unwrap();
    assert!(store.import_config(&import));

    // memory replaced wholesale, optional fields defaulted on the way in
    assert!(store.category("Old").is_none());
    let new = store.category("New").unwrap();
    assert_eq!(new.items[0].icon, DEFAULT_ICON);
    assert_eq!(new.items[0].workdir, "");

    // persisted to the primary location
    let reloaded = ConfigStore::load(&path);
    assert!(reloaded.category("New").is_some());

    // the pre-import on-disk state made it into the rotating backups
    let backups = store.backups();
    assert!(!backups.is_empty());
    assert!(backups[0].filename.starts_with(BACKUP_PREFIX));
    let latest = std::fs::read_to_string(&backups[0].filepath).unwrap();
    assert!(latest.contains("Old"));
}

#[test]
fn restore_backup_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut store = ConfigStore::load(&path);
    assert!(store.add_category("Keep"));
    // a second mutation snapshots the document that already contains "Keep"
    assert!(store.add_category("Scratch"));
    assert!(store.delete_category("Keep"));
    assert!(store.category("Keep").is_none());

    let backups = store.backups();
    let with_keep = backups
        .iter()
        .find(|b| {
            std::fs::read_to_string(&b.filepath)
                .map(|c| c.contains("Keep"))
                .unwrap_or(false)
        })
        .expect("a backup containing the deleted category");

    let backup_path = with_keep.filepath.clone();
    assert!(store.restore_backup(&backup_path));
    assert!(store.category("Keep").is_some());

    let reloaded = ConfigStore::load(&path);
    assert!(reloaded.category("Keep").is_some());
}
