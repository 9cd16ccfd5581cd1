//! Terminal progress bar helpers used by the CLI's bar observer.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Update the bar's total (the walk's count pass may land after the bar exists). Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Move the bar to an absolute position.
/// Uses try_lock so a contended bar never stalls the caller; the next update catches up.
pub fn set_bar_position(pb: &ProgressBar, n: usize) -> std::io::Result<()> {
    if let Ok(mut bar) = pb.try_lock() {
        bar.update_to(n)?;
    }
    Ok(())
}

/// Change the bar's description (e.g. "Paused").
pub fn set_bar_desc(pb: &ProgressBar, desc: &str) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.set_description(desc);
        let _ = bar.refresh();
    }
}

/// Force a refresh of the bar.
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}
