use chrono::Utc;
use std::fs;
use std::path::Path;
use std::time::Duration;
use syncscan::engine::{hash_bytes, load_comparison, load_report, save_comparison, save_report};
use syncscan::{
    ComparisonResult, EventKind, FileRecord, OperationStatus, ReportKind, ScanReport,
    ScanSession, SessionConfig,
};

fn record(path: &str, content: &[u8]) -> FileRecord {
    FileRecord {
        relative_path: path.to_string(),
        size_bytes: content.len() as u64,
        modified_at: Utc::now(),
        content_hash: hash_bytes(content),
    }
}

fn session() -> ScanSession {
    ScanSession::new(SessionConfig {
        num_workers: Some(2),
        pause_poll_interval: Duration::from_millis(20),
        ..Default::default()
    })
}

fn scan(session: &ScanSession, root: &Path, kind: ReportKind) -> anyhow::Result<ScanReport> {
    let outcome = session.start_scan(root, kind)?.wait()?;
    Ok(outcome.into_completed().expect("scan completed"))
}

// --- compare ---

#[test]
fn test_compare_classifies_paths() -> anyhow::Result<()> {
    let source = ScanReport::new(
        ReportKind::Source,
        "/src".into(),
        vec![
            record("same.txt", b"same"),
            record("changed.txt", b"new content"),
            record("missing.txt", b"only here"),
        ],
    );
    let destination = ScanReport::new(
        ReportKind::Destination,
        "/dst".into(),
        vec![
            record("same.txt", b"same"),
            record("changed.txt", b"old content"),
            record("extra.txt", b"stale"),
        ],
    );

    let session = session();
    let result = session
        .start_compare(source.clone(), destination.clone())?
        .wait()?
        .into_completed()
        .expect("compare completed");

    let paths = |v: &[FileRecord]| v.iter().map(|f| f.relative_path.clone()).collect::<Vec<_>>();
    assert_eq!(paths(&result.missing_in_dest), vec!["missing.txt"]);
    assert_eq!(paths(&result.different_in_dest), vec!["changed.txt"]);
    assert_eq!(paths(&result.only_in_dest), vec!["extra.txt"]);
    assert_eq!(result.different_in_dest[0], source.files[1]);
    assert_eq!(result.source_report, source.label());
    assert_eq!(result.destination_root, "/dst");
    assert!(!result.is_in_sync());

    let p = session.progress();
    assert_eq!((p.processed, p.total), (6, 6));
    assert_eq!(p.status, OperationStatus::Finished);
    Ok(())
}

#[test]
fn test_compare_progress_is_batched() -> anyhow::Result<()> {
    let files: Vec<FileRecord> = (0..250)
        .map(|i| record(&format!("f{i}.txt"), format!("{i}").as_bytes()))
        .collect();
    let source = ScanReport::new(ReportKind::Source, "/src".into(), files);
    let destination = ScanReport::new(ReportKind::Destination, "/dst".into(), Vec::new());

    let session = session();
    let events = session.subscribe();
    let result = session
        .start_compare(source, destination)?
        .wait()?
        .into_completed()
        .expect("compare completed");
    session.flush_events();

    assert_eq!(result.missing_in_dest.len(), 250);
    let batches: Vec<u64> = events
        .drain()
        .iter()
        .filter(|e| e.kind == EventKind::Progress && e.text.starts_with("Compared"))
        .map(|e| e.processed)
        .collect();
    assert_eq!(batches, vec![100, 200, 250]);
    Ok(())
}

// --- copy ---

#[test]
fn test_copy_brings_destination_in_sync() -> anyhow::Result<()> {
    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    fs::write(src.path().join("a.txt"), b"fresh")?;
    fs::create_dir(src.path().join("sub"))?;
    fs::write(src.path().join("sub").join("b.txt"), b"nested")?;
    fs::write(dst.path().join("a.txt"), b"stale")?;
    fs::write(dst.path().join("extra.txt"), b"keep me")?;

    let session = session();
    let source = scan(&session, src.path(), ReportKind::Source)?;
    let destination = scan(&session, dst.path(), ReportKind::Destination)?;
    let comparison = session
        .start_compare(source.clone(), destination)?
        .wait()?
        .into_completed()
        .expect("compare completed");
    assert_eq!(comparison.pending_copies().count(), 2);

    let summary = session
        .start_copy(comparison)?
        .wait()?
        .into_completed()
        .expect("copy completed");
    assert_eq!(summary.copied, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.bytes, 11);
    assert_eq!(fs::read(dst.path().join("a.txt"))?, b"fresh");
    assert_eq!(fs::read(dst.path().join("sub").join("b.txt"))?, b"nested");

    let destination = scan(&session, dst.path(), ReportKind::Destination)?;
    let after = session
        .start_compare(source, destination)?
        .wait()?
        .into_completed()
        .expect("compare completed");
    assert!(after.missing_in_dest.is_empty());
    assert!(after.different_in_dest.is_empty());
    assert_eq!(after.only_in_dest.len(), 1);
    Ok(())
}

#[test]
fn test_copy_rejects_escaping_paths() -> anyhow::Result<()> {
    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    fs::write(src.path().join("ok.txt"), b"ok")?;

    let comparison = ComparisonResult {
        source_root: src.path().to_string_lossy().into_owned(),
        destination_root: dst.path().to_string_lossy().into_owned(),
        missing_in_dest: vec![record("ok.txt", b"ok"), record("../evil.txt", b"x")],
        generated_at: Utc::now(),
        ..Default::default()
    };

    let session = session();
    let events = session.subscribe();
    let summary = session
        .start_copy(comparison)?
        .wait()?
        .into_completed()
        .expect("copy completed");
    session.flush_events();

    assert_eq!(summary.copied, 1);
    assert_eq!(summary.failed, 1);
    assert!(!dst.path().parent().unwrap().join("evil.txt").exists());
    assert!(
        events
            .drain()
            .iter()
            .any(|e| e.kind == EventKind::Log && e.text.starts_with("ERROR: ../evil.txt"))
    );
    Ok(())
}

// --- persistence ---

#[test]
fn test_report_save_and_load() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("collected_data");
    let report = ScanReport::new(
        ReportKind::Destination,
        "/dst".into(),
        vec![record("a.txt", b"abcd"), record("sub/c.txt", b"0123456789")],
    );

    let path = save_report(&out, &report)?;
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("destination_"));
    assert!(name.ends_with(".json"));
    assert_eq!(name, format!("{}.json", report.label()));

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&path)?)?;
    assert_eq!(json["type"], "destination");
    assert_eq!(json["files"][0]["path"], "a.txt");
    assert_eq!(json["files"][0]["size"], 4);
    assert!(json["files"][0]["mod_time"].is_string());

    let loaded = load_report(&path)?;
    assert_eq!(loaded.kind, report.kind);
    assert_eq!(loaded.files, report.files);
    assert_eq!(loaded.generated_at, report.generated_at);
    Ok(())
}

#[test]
fn test_comparison_save_and_load() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let result = ComparisonResult {
        source_root: "/src".into(),
        destination_root: "/dst".into(),
        missing_in_dest: vec![record("a.txt", b"a")],
        generated_at: Utc::now(),
        ..Default::default()
    };
    let path = save_comparison(dir.path(), &result)?;
    assert!(
        path.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("comparison_")
    );
    let loaded = load_comparison(&path)?;
    assert_eq!(loaded.missing_in_dest, result.missing_in_dest);
    assert_eq!(loaded.destination_root, "/dst");
    Ok(())
}

#[test]
fn test_load_report_rejects_garbage() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.json");
    fs::write(&path, b"not json")?;
    assert!(load_report(&path).is_err());
    assert!(load_report(&dir.path().join("absent.json")).is_err());
    Ok(())
}
