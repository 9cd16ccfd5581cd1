use std::path::{Path, PathBuf};
use std::time::Duration;
use syncscan::engine::{
    hash_bytes, hash_file, is_contained_relative, path_relative_to, path_to_report_string,
    report_path_for,
};
use syncscan::utils::{
    PollConsts, QueueConsts, apply_file_to_opts, parse_syncscan_toml, temp_path_for,
    write_atomically,
};
use syncscan::{RunOpts, SessionConfig};

// --- path_relative_to ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

// --- report paths ---

#[test]
fn test_path_to_report_string_normalizes_backslashes() {
    assert_eq!(
        path_to_report_string(&PathBuf::from("sub\\c.txt")),
        "sub/c.txt"
    );
}

#[test]
fn test_report_path_for_nested_file() {
    let root = PathBuf::from("/data/root");
    let abs = root.join("sub").join("c.txt");
    assert_eq!(report_path_for(&abs, &root), "sub/c.txt");
}

#[test]
fn test_report_path_for_root_is_file() {
    let abs = PathBuf::from("/data/single.bin");
    assert_eq!(report_path_for(&abs, &abs), "single.bin");
}

#[test]
fn test_is_contained_relative() {
    assert!(is_contained_relative(Path::new("a.txt")));
    assert!(is_contained_relative(Path::new("sub/dir/b.txt")));
    assert!(!is_contained_relative(Path::new("../escape.txt")));
    assert!(!is_contained_relative(Path::new("sub/../../escape.txt")));
    assert!(!is_contained_relative(Path::new("/etc/passwd")));
    assert!(!is_contained_relative(Path::new("")));
}

// --- hashing ---

#[test]
fn test_hash_bytes_empty_known_vector() {
    assert_eq!(
        hash_bytes(b""),
        "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
    );
}

#[test]
fn test_hash_file_matches_hash_bytes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("data.bin");
    let content: Vec<u8> = (0..3_000_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &content)?;
    let digest = hash_file(&path, content.len() as u64)?;
    assert_eq!(digest, hash_bytes(&content));
    assert_eq!(digest.len(), 64);
    Ok(())
}

#[test]
fn test_hash_file_missing_is_error() {
    assert!(hash_file(Path::new("/nonexistent/syncscan/file"), 0).is_err());
}

// --- session config ---

#[test]
fn test_session_config_defaults() {
    let config = SessionConfig::default();
    assert_eq!(config.pause_poll_interval, PollConsts::PAUSE_POLL_INTERVAL);
    assert_eq!(config.result_queue_cap, QueueConsts::RESULT_QUEUE_CAP);
    assert!(!config.follow_links);
    assert!(config.effective_workers() >= 1);
    assert_eq!(config.effective_job_queue_cap(), config.effective_workers());
}

#[test]
fn test_session_config_worker_override_and_floor() {
    let config = SessionConfig {
        num_workers: Some(3),
        ..Default::default()
    };
    assert_eq!(config.effective_workers(), 3);

    let config = SessionConfig {
        num_workers: Some(0),
        job_queue_cap: Some(0),
        ..Default::default()
    };
    assert_eq!(config.effective_workers(), 1);
    assert_eq!(config.effective_job_queue_cap(), 1);
}

// --- .syncscan.toml ---

#[test]
fn test_toml_applies_only_present_fields() -> anyhow::Result<()> {
    let file = parse_syncscan_toml(
        r#"
[settings]
output_dir = "reports"
workers = 2
poll_ms = 50
follow_links = true
"#,
    )?;
    let mut opts = RunOpts::default();
    apply_file_to_opts(&file, &mut opts);
    assert_eq!(opts.output_dir, PathBuf::from("reports"));
    assert_eq!(opts.comparison_dir, RunOpts::default().comparison_dir);
    assert_eq!(opts.session.num_workers, Some(2));
    assert_eq!(opts.session.pause_poll_interval, Duration::from_millis(50));
    assert!(opts.session.follow_links);
    assert!(!opts.verbose);
    Ok(())
}

#[test]
fn test_toml_empty_and_invalid() {
    assert!(parse_syncscan_toml("").is_ok());
    assert!(parse_syncscan_toml("[settings]\nworkers = \"many\"").is_err());
}

// --- temp files ---

#[test]
fn test_temp_path_for_appends_tmp() {
    assert_eq!(
        temp_path_for(Path::new("out/source_20240101_000000.json")),
        PathBuf::from("out/source_20240101_000000.json.tmp")
    );
}

#[test]
fn test_write_atomically_leaves_no_temp() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("report.json");
    write_atomically(&path, b"{}")?;
    write_atomically(&path, b"{\"a\":1}")?;
    assert_eq!(std::fs::read_to_string(&path)?, "{\"a\":1}");
    assert!(!temp_path_for(&path).exists());
    Ok(())
}
