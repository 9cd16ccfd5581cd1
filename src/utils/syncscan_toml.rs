//! Load `.syncscan.toml` from a directory (CLI only). Lib callers pass a `SessionConfig` instead.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::RunOpts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct SyncscanToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    output_dir: Option<String>,
    comparison_dir: Option<String>,
    workers: Option<usize>,
    poll_ms: Option<u64>,
    follow_links: Option<bool>,
    verbose: Option<bool>,
    json_events: Option<bool>,
}

/// Parse settings from a TOML string.
pub fn parse_syncscan_toml(s: &str) -> Result<SyncscanToml, toml::de::Error> {
    toml::from_str(s)
}

/// Load `.syncscan.toml` from `dir` if present. Returns None if the file is missing or invalid.
pub fn load_syncscan_toml(dir: &Path) -> Option<SyncscanToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_syncscan_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident => $($target:ident).+) => {
        if let Some(v) = $section.$field {
            $opts.$($target).+ = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &SyncscanToml, opts: &mut RunOpts) {
    let s = &file.settings;
    if let Some(ref p) = s.output_dir {
        opts.output_dir = PathBuf::from(p);
    }
    if let Some(ref p) = s.comparison_dir {
        opts.comparison_dir = PathBuf::from(p);
    }
    if let Some(n) = s.workers {
        opts.session.num_workers = Some(n);
    }
    if let Some(ms) = s.poll_ms {
        opts.session.pause_poll_interval = Duration::from_millis(ms);
    }
    apply_file_opt!(s, opts, follow_links => session.follow_links);
    apply_file_opt!(s, opts, verbose => verbose);
    apply_file_opt!(s, opts, json_events => json_events);
}
