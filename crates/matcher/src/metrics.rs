// Metrics hooks for the confirmation stage.
//
// Callers install a global `ConfirmMetrics` implementation via
// [`set_confirm_metrics`]; every call to `DuplicateFilter::confirm` then
// reports its latency, how many candidates it examined and whether it
// confirmed a duplicate.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Metrics observer for confirmation runs.
pub trait ConfirmMetrics: Send + Sync {
    /// `candidates` counts the candidates whose tokens were compared, after
    /// the minimum-length gate.
    fn record_confirm(&self, latency: Duration, candidates: usize, confirmed: bool);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn ConfirmMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn ConfirmMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn ConfirmMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global confirmation metrics recorder.
pub fn set_confirm_metrics(recorder: Option<Arc<dyn ConfirmMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
