//! Scan pipeline: context, checkpoint, two-pass walk, hash workers, collector, coordinator.

pub mod checkpoint;
pub mod collector;
pub mod context;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use checkpoint::{Checkpoint, checkpoint};
pub use collector::collect_results;
pub use context::{
    OperationContext, PipelineChannels, PipelineContext, PipelineHandles, create_pipeline_channels,
};
pub use orchestrator::run_scan;
pub use walk::{count_files, spawn_walk_thread, stream_paths};
pub use worker::{path_to_record, spawn_hash_workers};
