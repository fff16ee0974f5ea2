//! Per-stage progress display for a single pipeline run

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use crate::pipeline::stage::Stage;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar advancing once per pipeline stage
///
/// Hidden bars swallow all updates, so callers need not branch on `--quiet`.
pub struct StageProgress {
    bar: ProgressBar,
}

impl StageProgress {
    /// Visible bar on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(STAGE_STYLE.clone());
        Self { bar }
    }

    /// Bar that never draws
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Reset for a pipeline of `stage_count` stages
    pub fn start(&self, stage_count: usize) {
        self.bar.set_length(stage_count as u64);
        self.bar.set_position(0);
        self.bar.set_message("starting");
    }

    /// Report that stage `index` is about to run
    pub fn stage(&self, index: usize, stage: Stage) {
        self.bar.set_position(index as u64);
        self.bar.set_message(stage.name());
    }

    /// Mark every stage complete and remove the bar
    pub fn finish(&self) {
        if let Some(length) = self.bar.length() {
            self.bar.set_position(length);
        }
        self.bar.finish_and_clear();
    }

    /// Stages reported so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total number of stages
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}
