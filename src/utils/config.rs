//! Application configuration constants and session settings.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

use crate::utils::fd_limit::max_workers_by_fd_limit;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    reports_dir: String,
    comparisons_dir: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                reports_dir: "collected_data".to_string(),
                comparisons_dir: "comparison_results".to_string(),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Optional settings file looked up in the working directory.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Default directory for scan reports.
    pub fn reports_dir(&self) -> &str {
        &self.reports_dir
    }

    /// Default directory for comparison results.
    pub fn comparisons_dir(&self) -> &str {
        &self.comparisons_dir
    }
}

// ---- Worker threads ----

/// Thread limits for the hash worker pool.
/// Use [`WorkerThreadLimits::current()`] to fill `all_threads` from rayon; the rest are const.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Floor / minimum worker count.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }
}

// ---- Queues ----

/// Capacities for the pipeline and broadcast queues.
pub struct QueueConsts;

impl QueueConsts {
    /// Result queue between workers and the collector.
    pub const RESULT_QUEUE_CAP: usize = 1000;
    /// Hub command queue (register / unregister / publish).
    pub const EVENT_BUFFER_CAP: usize = 4096;
    /// Per-subscriber event queue; a subscriber that falls this far behind is dropped.
    pub const SUBSCRIBER_QUEUE_CAP: usize = 1024;
}

// ---- Pause polling ----

pub struct PollConsts;

impl PollConsts {
    /// How often a paused worker re-checks the pause flag.
    pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(500);
}

// ---- Progress / chunking ----

/// Progress event batching.
pub struct ProgressConsts;

impl ProgressConsts {
    /// Compare stage publishes one progress event per this many items.
    pub const PROGRESS_UPDATE_BATCH_SIZE: u64 = 100;
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Session ----

/// Settings for a [`ScanSession`](crate::ScanSession). Defaults come from the constants above.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Override worker thread count. When None, one per core capped by the FD limit.
    pub num_workers: Option<usize>,
    /// Poll interval of a paused worker. Also the upper bound on pause latency.
    pub pause_poll_interval: Duration,
    /// Job queue capacity. When None, equal to the worker count.
    pub job_queue_cap: Option<usize>,
    pub result_queue_cap: usize,
    pub event_buffer_cap: usize,
    pub subscriber_queue_cap: usize,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_workers: None,
            pause_poll_interval: PollConsts::PAUSE_POLL_INTERVAL,
            job_queue_cap: None,
            result_queue_cap: QueueConsts::RESULT_QUEUE_CAP,
            event_buffer_cap: QueueConsts::EVENT_BUFFER_CAP,
            subscriber_queue_cap: QueueConsts::SUBSCRIBER_QUEUE_CAP,
            follow_links: false,
        }
    }
}

impl SessionConfig {
    /// Worker count actually used: explicit override, else all cores capped by the FD limit.
    pub fn effective_workers(&self) -> usize {
        let limits = WorkerThreadLimits::current();
        let n = match self.num_workers {
            Some(n) => n,
            None => match max_workers_by_fd_limit() {
                Some(cap) => limits.all_threads.min(cap),
                None => limits.all_threads,
            },
        };
        n.max(limits.floor)
    }

    pub fn effective_job_queue_cap(&self) -> usize {
        self.job_queue_cap
            .unwrap_or_else(|| self.effective_workers())
            .max(1)
    }
}
