use chrono::NaiveDate;
use dailynote_core::{FsVault, NoteId, VaultError, VaultLayout, VaultRepository};
use std::fs;
use std::path::{Path, PathBuf};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn daily_vault(root: &Path) -> FsVault {
    FsVault::new(
        root,
        VaultLayout {
            note_folder: PathBuf::from("Daily"),
            date_format: "YYYY-MM-DD".to_string(),
            template: Some(PathBuf::from("Templates/Daily")),
        },
    )
}

#[test]
fn create_note_renders_template_and_refuses_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Templates")).unwrap();
    fs::write(
        dir.path().join("Templates/Daily.md"),
        "# {{title}}\n{{date:dddd}}\n## Tasks\n",
    )
    .unwrap();
    let vault = daily_vault(dir.path());

    let id = vault.create_note(day(2024, 3, 4)).unwrap();
    assert_eq!(id, NoteId::new("2024-03-04"));
    assert_eq!(
        vault.read_note(&id).unwrap(),
        "# 2024-03-04\nMonday\n## Tasks\n"
    );

    assert!(matches!(
        vault.create_note(day(2024, 3, 4)),
        Err(VaultError::NoteExists(_))
    ));
}

#[test]
fn missing_template_creates_empty_note() {
    let dir = tempfile::tempdir().unwrap();
    let vault = daily_vault(dir.path());

    let id = vault.create_note(day(2024, 3, 4)).unwrap();
    assert_eq!(vault.read_note(&id).unwrap(), "");
    assert!(dir.path().join("Daily/2024-03-04.md").is_file());
}

#[test]
fn list_notes_keys_daily_files_by_date() {
    let dir = tempfile::tempdir().unwrap();
    let daily = dir.path().join("Daily");
    fs::create_dir_all(daily.join("Nested")).unwrap();
    fs::write(daily.join("2024-03-03.md"), "").unwrap();
    fs::write(daily.join("2024-03-04.md"), "").unwrap();
    fs::write(daily.join("groceries.md"), "").unwrap();
    fs::write(daily.join("2024-03-05.txt"), "").unwrap();
    fs::write(daily.join("Nested/2024-03-01.md"), "").unwrap();
    let vault = daily_vault(dir.path());

    let notes = vault.list_notes().unwrap();
    assert_eq!(
        notes.keys().cloned().collect::<Vec<_>>(),
        ["day-2024-03-03", "day-2024-03-04"]
    );
    let meta = &notes["day-2024-03-04"];
    assert_eq!(meta.id, NoteId::new("2024-03-04"));
    assert_eq!(meta.path, PathBuf::from("Daily/2024-03-04.md"));
    assert_eq!(meta.date, day(2024, 3, 4));
}

#[test]
fn list_notes_on_missing_folder_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let vault = daily_vault(dir.path());
    assert!(vault.list_notes().unwrap().is_empty());
}

#[test]
fn custom_date_format_names_and_lists_notes() {
    let dir = tempfile::tempdir().unwrap();
    let vault = FsVault::new(
        dir.path(),
        VaultLayout {
            note_folder: PathBuf::new(),
            date_format: "DD.MM.YYYY".to_string(),
            template: None,
        },
    );

    let id = vault.create_note(day(2024, 3, 4)).unwrap();
    assert_eq!(id, NoteId::new("04.03.2024"));
    assert_eq!(vault.note_for_date(day(2024, 3, 4)).unwrap(), Some(id));
    assert_eq!(vault.note_for_date(day(2024, 3, 5)).unwrap(), None);
    assert!(vault.list_notes().unwrap().contains_key("day-2024-03-04"));
}

#[test]
fn write_requires_existing_note() {
    let dir = tempfile::tempdir().unwrap();
    let vault = daily_vault(dir.path());

    assert!(matches!(
        vault.write_note(&NoteId::new("2024-03-04"), "text"),
        Err(VaultError::NoteNotFound(_))
    ));
    assert!(matches!(
        vault.read_note(&NoteId::new("../secrets")),
        Err(VaultError::InvalidNoteName(_))
    ));
}

#[test]
fn rename_moves_note_and_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let vault = daily_vault(dir.path());
    let id = vault.create_note(day(2024, 3, 1)).unwrap();
    vault.write_note(&id, "old day").unwrap();

    vault
        .rename_note(&id, Path::new("Archive/2024-03-01.md"))
        .unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("Archive/2024-03-01.md")).unwrap(),
        "old day"
    );
    assert!(!dir.path().join("Daily/2024-03-01.md").exists());

    let again = vault.create_note(day(2024, 3, 1)).unwrap();
    assert!(matches!(
        vault.rename_note(&again, Path::new("Archive/2024-03-01.md")),
        Err(VaultError::NoteExists(_))
    ));
    assert!(matches!(
        vault.rename_note(&again, Path::new("../outside.md")),
        Err(VaultError::InvalidNoteName(_))
    ));
}

#[test]
fn list_folders_skips_hidden_and_filters_fuzzily() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Daily/Archive")).unwrap();
    fs::create_dir_all(dir.path().join("Templates")).unwrap();
    fs::create_dir_all(dir.path().join(".obsidian/plugins")).unwrap();
    let vault = daily_vault(dir.path());

    assert_eq!(
        vault.list_folders("").unwrap(),
        ["Daily", "Daily/Archive", "Templates"]
    );
    assert_eq!(vault.list_folders("arch").unwrap(), ["Daily/Archive"]);
}
