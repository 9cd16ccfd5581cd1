//! Engine: CLI parsing and handlers, hashing, path tools, progress bars, report persistence.

pub mod arg_parser;
pub mod handlers;
pub mod hashing;
pub mod progress;
pub mod report_io;
pub mod tools;

pub use arg_parser::{Cli, Commands, CommonArgs};
pub use handlers::handle_run;
pub use hashing::{hash_bytes, hash_file};
pub use report_io::{load_comparison, load_report, save_comparison, save_report};
pub use tools::{is_contained_relative, path_relative_to, path_to_report_string, report_path_for};
