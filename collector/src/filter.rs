//! Which videos make it into the export.

/// View count a video needs when nothing else is configured.
pub const DEFAULT_THRESHOLD: u64 = 1000;

/// Returns true if a video with `view_count` views should be kept under `threshold`.
pub fn keep(view_count: u64, threshold: u64) -> bool {
    view_count >= threshold
}

/// The per-run record filter. The threshold is fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFilter {
    threshold: u64,
}

impl RecordFilter {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn keep(&self, view_count: u64) -> bool {
        keep(view_count, self.threshold)
    }
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
