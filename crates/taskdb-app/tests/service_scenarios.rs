//! End-to-end scenarios for `TaskService` over a real SQLite file.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use taskdb_app::{ErrorKind, StatusLabels, TaskService};
use taskdb_core::Task;
use taskdb_core::id::TaskId;
use taskdb_store_sqlite::SqliteStore;
use tempfile::TempDir;

/// Test helper: open a service over a fresh database inside a temp dir.
fn setup() -> (TempDir, PathBuf, TaskService<SqliteStore>) {
    let temp_dir = TempDir::with_prefix("taskdb-scenario-").expect("create temp dir");
    let db_path = temp_dir.path().join("tasks.db");
    let store = SqliteStore::open(&db_path).expect("open sqlite store");
    (temp_dir, db_path, TaskService::new(store, StatusLabels::default()))
}

fn write_snapshot(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write snapshot");
    path
}

fn task(id: i64, title: &str, description: &str, completed: bool) -> Task {
    Task {
        id: TaskId(id),
        title: title.into(),
        description: description.into(),
        completed,
    }
}

#[test]
fn scenario_a_create_and_list() {
    let (_dir, _db, mut service) = setup();

    let created = service.add("Buy milk", "2% milk, 1 gal").expect("add task");
    assert_eq!(created, task(1, "Buy milk", "2% milk, 1 gal", false));

    let all = service.store().list_all().expect("list");
    assert_eq!(all, vec![task(1, "Buy milk", "2% milk, 1 gal", false)]);
}

#[test]
fn scenario_b_complete_on_empty_store_is_not_found() {
    let (_dir, _db, mut service) = setup();
    let err = service.complete(TaskId(99)).expect_err("no task 99");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn scenario_c_empty_title_is_rejected_and_store_unchanged() {
    let (_dir, _db, mut service) = setup();
    let err = service.add("", "x").expect_err("empty title");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(service.list().expect("list").is_empty());
}

#[test]
fn scenario_d_purge_removes_completed_only() {
    let (dir, _db, mut service) = setup();
    let path = write_snapshot(
        dir.path(),
        "seed.json",
        r#"[{"id":1,"title":"a","description":"x","completed":true},
            {"id":2,"title":"b","description":"y","completed":false}]"#,
    );
    service.import(&path).expect("seed store");

    assert_eq!(service.purge_completed().expect("purge"), 1);
    assert_eq!(
        service.store().list_all().expect("list"),
        vec![task(2, "b", "y", false)]
    );
}

#[test]
fn scenario_e_import_is_exact_and_idempotent() {
    let (dir, _db, mut service) = setup();
    let path = write_snapshot(
        dir.path(),
        "tasks.json",
        r#"[{"id":5,"title":"T","description":"D","completed":true}]"#,
    );

    let first = service.import(&path).expect("first import");
    assert_eq!(first.inserted, 1);
    assert_eq!(service.show(TaskId(5)).expect("task 5"), task(5, "T", "D", true));
    let after_first = service.store().list_all().expect("list");

    let second = service.import(&path).expect("second import");
    assert!(!second.changed_anything());
    assert_eq!(second.unchanged, 1);
    assert_eq!(service.store().list_all().expect("list"), after_first);
}

#[test]
fn created_ids_are_pairwise_distinct() {
    let (_dir, _db, mut service) = setup();
    let mut seen = HashSet::new();
    for n in 0..20 {
        let created = service.add(&format!("task {n}"), "body").expect("add");
        assert!(seen.insert(created.id));
    }
}

#[test]
fn completion_is_monotonic_across_other_commands() {
    let (dir, _db, mut service) = setup();
    let created = service.add("Water plants", "Balcony").expect("add");
    service.complete(created.id).expect("complete");

    service.complete(created.id).expect("complete twice");
    service.add("Another", "task").expect("add more");
    service.export(&dir.path().join("backup.json")).expect("export");
    let unrelated = write_snapshot(
        dir.path(),
        "unrelated.json",
        r#"[{"id":40,"title":"x","description":"y","completed":false}]"#,
    );
    service.import(&unrelated).expect("import");

    assert!(service.show(created.id).expect("show").completed);
}

#[test]
fn completed_state_survives_reads_until_purged() {
    let (_dir, _db, mut service) = setup();
    let created = service.add("Pay rent", "Before the 5th").expect("add");
    service.complete(created.id).expect("complete");

    for _ in 0..3 {
        assert!(service.show(created.id).expect("show").completed);
        assert_eq!(service.list().expect("list")[0].status_label, "Completed");
    }
}

#[test]
fn purge_keeps_pending_tasks_unchanged() {
    let (_dir, _db, mut service) = setup();
    let keep_a = service.add("keep a", "pending").expect("add");
    let finished = service.add("finished", "done").expect("add");
    let keep_b = service.add("keep b", "pending").expect("add");
    service.complete(finished.id).expect("complete");

    assert_eq!(service.purge_completed().expect("purge"), 1);

    let remaining = service.store().list_all().expect("list");
    assert!(remaining.iter().all(|task| !task.completed));
    assert_eq!(remaining, vec![keep_a, keep_b]);
}

#[test]
fn export_then_import_round_trips_through_a_new_database() {
    let (dir, _db, mut service) = setup();
    service.add("first", "one").expect("add");
    let second = service.add("second", "two").expect("add");
    service.complete(second.id).expect("complete");

    let snapshot = dir.path().join("export.json");
    let output = service.export(&snapshot).expect("export");
    assert_eq!(output.count, 2);

    let other_db = dir.path().join("other.db");
    let mut other = TaskService::new(
        SqliteStore::open(&other_db).expect("open other store"),
        StatusLabels::default(),
    );
    other.import(&snapshot).expect("import");

    assert_eq!(
        other.store().list_all().expect("list"),
        service.store().list_all().expect("list")
    );
}

#[test]
fn import_overwrites_matching_ids_and_keeps_others() {
    let (dir, _db, mut service) = setup();
    service.add("local one", "kept").expect("add");
    service.add("local two", "overwritten").expect("add");

    let path = write_snapshot(
        dir.path(),
        "merge.json",
        r#"[{"id":2,"title":"remote two","description":"from snapshot","completed":true},
            {"id":10,"title":"remote ten","description":"new","completed":false}]"#,
    );
    let summary = service.import(&path).expect("import");
    assert_eq!((summary.inserted, summary.updated, summary.unchanged), (1, 1, 0));

    assert_eq!(
        service.store().list_all().expect("list"),
        vec![
            task(1, "local one", "kept", false),
            task(2, "remote two", "from snapshot", true),
            task(10, "remote ten", "new", false),
        ]
    );

    let next = service.add("after import", "fresh id").expect("add");
    assert_eq!(next.id, TaskId(11));
}

#[test]
fn failed_import_rolls_back_every_record() {
    let (dir, db_path, mut service) = setup();
    service.add("original", "untouched").expect("add");

    let side_channel = rusqlite::Connection::open(&db_path).expect("open side connection");
    side_channel
        .execute_batch(
            "CREATE TRIGGER refuse_poison BEFORE INSERT ON tasks
             WHEN NEW.title = 'poison'
             BEGIN SELECT RAISE(ABORT, 'poison record'); END;",
        )
        .expect("install trigger");
    drop(side_channel);

    let path = write_snapshot(
        dir.path(),
        "poisoned.json",
        r#"[{"id":1,"title":"original","description":"rewritten","completed":true},
            {"id":2,"title":"fine","description":"ok","completed":false},
            {"id":3,"title":"poison","description":"fails","completed":false}]"#,
    );
    let err = service.import(&path).expect_err("trigger aborts the batch");
    assert_eq!(err.kind(), ErrorKind::Store);

    assert_eq!(
        service.store().list_all().expect("list"),
        vec![task(1, "original", "untouched", false)]
    );
}

#[test]
fn malformed_snapshots_leave_store_untouched() {
    let (dir, _db, mut service) = setup();
    service.add("original", "untouched").expect("add");
    let before = service.store().list_all().expect("list");

    let broken = write_snapshot(dir.path(), "broken.json", "not json at all");
    assert_eq!(service.import(&broken).expect_err("format").kind(), ErrorKind::Format);

    let missing_field = write_snapshot(
        dir.path(),
        "missing.json",
        r#"[{"id":1,"title":"changed","description":"x","completed":true},{"id":2,"title":"x"}]"#,
    );
    assert_eq!(
        service.import(&missing_field).expect_err("schema").kind(),
        ErrorKind::Schema
    );

    assert_eq!(service.store().list_all().expect("list"), before);
}

#[test]
fn snapshot_with_repeated_id_is_rejected_every_time() {
    let (dir, _db, mut service) = setup();
    let path = write_snapshot(
        dir.path(),
        "repeated.json",
        r#"[{"id":1,"title":"A","description":"first","completed":false},
            {"id":1,"title":"B","description":"second","completed":true}]"#,
    );

    for _ in 0..2 {
        let err = service.import(&path).expect_err("repeated id");
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("duplicate id 1"), "{err}");
    }
    assert!(service.store().list_all().expect("list").is_empty());
}

#[test]
fn data_persists_across_sessions() {
    let (_dir, db_path, mut service) = setup();
    let created = service.add("Persist", "Across sessions").expect("add");
    service.complete(created.id).expect("complete");
    drop(service.into_store());

    let reopened = TaskService::new(
        SqliteStore::open(&db_path).expect("reopen store"),
        StatusLabels::default(),
    );
    let rows = reopened.list().expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Persist");
    assert_eq!(rows[0].status_label, "Completed");
}
