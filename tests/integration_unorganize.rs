use assert_fs::prelude::*;
use assert_fs::TempDir;
use file_organizer::core::orchestrator::{BatchOrchestrator, CleanupPolicy};
use file_organizer::core::resolver::Strategy;
use file_organizer::events::{CleanupEvent, Event, EventChannel, WalkEvent};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;

fn total_bytes(dir: &Path) -> u64 {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.metadata().unwrap().len())
        .sum()
}

fn file_count(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

#[test]
fn organize_then_unorganize_round_trip() {
    let inbox = TempDir::new().unwrap();
    let sorted = TempDir::new().unwrap();
    let flat = TempDir::new().unwrap();

    let names = ["a.txt", "b.jpg", "c.mp3", "d.zip", "e.csv"];
    for (i, name) in names.iter().enumerate() {
        inbox.child(name).write_str(&"x".repeat(i + 1)).unwrap();
    }
    let bytes_before = total_bytes(inbox.path());

    let organizer = BatchOrchestrator::builder()
        .strategy(Strategy::Type)
        .build()
        .unwrap();
    let organized = organizer.organize(inbox.path(), sorted.path()).unwrap();
    assert_eq!(organized.progress.successful_files, names.len());

    let unorganizer = BatchOrchestrator::builder().build().unwrap();
    let flattened = unorganizer.unorganize(sorted.path(), flat.path()).unwrap();

    assert!(flattened.is_complete());
    assert_eq!(flattened.progress.successful_files, names.len());
    assert_eq!(file_count(flat.path()), names.len());
    assert_eq!(total_bytes(flat.path()), bytes_before);
    for name in names {
        flat.child(name).assert(predicate::path::is_file());
    }
    assert_eq!(file_count(sorted.path()), 0);
}

#[test]
fn unorganize_suffixes_collisions() {
    let sorted = TempDir::new().unwrap();
    let flat = TempDir::new().unwrap();
    for folder in ["2022/01", "2023/05", "2024/11"] {
        let dir = sorted.child(folder);
        dir.create_dir_all().unwrap();
        dir.child("IMG_0001.jpg").write_str(folder).unwrap();
    }

    let orchestrator = BatchOrchestrator::builder().build().unwrap();
    let report = orchestrator.unorganize(sorted.path(), flat.path()).unwrap();

    assert_eq!(report.progress.successful_files, 3);
    flat.child("IMG_0001.jpg").assert("2022/01");
    flat.child("IMG_0001_unorg_1.jpg").assert("2023/05");
    flat.child("IMG_0001_unorg_2.jpg").assert("2024/11");
}

#[test]
fn unorganize_removes_emptied_directories() {
    let sorted = TempDir::new().unwrap();
    let flat = TempDir::new().unwrap();
    let nested = sorted.child("2024/03/Documents");
    nested.create_dir_all().unwrap();
    nested.child("memo.txt").write_str("memo").unwrap();
    sorted.child("Archives").create_dir_all().unwrap();

    let (sender, receiver) = EventChannel::new();
    let orchestrator = BatchOrchestrator::builder()
        .remove_empty_source(true)
        .cleanup_policy(CleanupPolicy {
            attempts: 2,
            delay: Duration::from_millis(5),
        })
        .build()
        .unwrap();
    let report = orchestrator
        .unorganize_with_events(sorted.path(), flat.path(), &sender)
        .unwrap();

    let cleanup = report.cleanup.expect("cleanup should run");
    assert_eq!(cleanup.removed.len(), 4);
    assert!(cleanup.failures.is_empty());
    sorted.assert(predicate::path::is_dir());
    assert_eq!(fs::read_dir(sorted.path()).unwrap().count(), 0);
    flat.child("memo.txt").assert("memo");

    let events = receiver.drain();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Walk(WalkEvent::Completed { files_found: 1, skipped: 0 }))));
    assert!(matches!(
        events.last(),
        Some(Event::Cleanup(CleanupEvent::Completed { removed: 4, failed: 0 }))
    ));
}

#[test]
fn unorganize_keeps_directories_without_cleanup() {
    let sorted = TempDir::new().unwrap();
    let flat = TempDir::new().unwrap();
    sorted.child("Images").create_dir_all().unwrap();
    sorted.child("Images/pic.png").write_str("png").unwrap();

    let orchestrator = BatchOrchestrator::builder()
        .remove_empty_source(false)
        .build()
        .unwrap();
    let report = orchestrator.unorganize(sorted.path(), flat.path()).unwrap();

    assert!(report.cleanup.is_none());
    sorted.child("Images").assert(predicate::path::is_dir());
    flat.child("pic.png").assert(predicate::path::is_file());
}
