pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod syncscan_toml;
pub mod tempfiles;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, max_workers_by_fd_limit};
pub use logger::setup_logging;
pub use syncscan_toml::{apply_file_to_opts, load_syncscan_toml, parse_syncscan_toml};
pub use tempfiles::{rename_temp_to_final, temp_path_for, write_atomically};
