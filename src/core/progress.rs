//! Throttled transfer progress rendering.
//!
//! Backends push [`TransferProgress`] samples over an mpsc channel at
//! whatever cadence suits them; the reporter decides when a sample is worth
//! rendering. Display surfaces may be rate limited (a chat message edit, for
//! example), so updates are only pushed when the elapsed time lands on a
//! ten-second window, or when the transfer completes.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::debug;

use crate::core::format::{format_duration, humanbytes};
use crate::display::StatusDisplay;

const BAR_CELLS: usize = 20;
const BAR_FILLED: &str = "█";
const BAR_EMPTY: &str = "░";

/// A single byte-count sample emitted by a backend during a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred: u64,
    pub total: u64,
}

/// Renders progress for one transfer to a [`StatusDisplay`].
///
/// Any error while formatting or pushing an update is swallowed: progress
/// reporting must never abort the underlying transfer.
pub struct ProgressReporter {
    label: String,
    display: Arc<dyn StatusDisplay>,
    started: Instant,
}

impl ProgressReporter {
    pub fn new(label: impl Into<String>, display: Arc<dyn StatusDisplay>) -> Self {
        Self {
            label: label.into(),
            display,
            started: Instant::now(),
        }
    }

    /// Consume samples until the sending side of the channel is dropped.
    pub async fn drain(self, mut samples: mpsc::Receiver<TransferProgress>) {
        while let Some(sample) = samples.recv().await {
            self.report(sample.transferred, sample.total).await;
        }
    }

    /// Handle one sample, rendering if the throttle window allows it.
    pub async fn report(&self, transferred: u64, total: u64) {
        // Total size is unknown until metadata resolves; nothing to render yet.
        if total == 0 || transferred > total {
            return;
        }

        let mut elapsed = self.started.elapsed().as_secs_f64();
        if elapsed == 0.0 {
            elapsed = 1e-6;
        }

        if !should_render(elapsed, transferred, total) {
            return;
        }

        let text = render_status(&self.label, transferred, total, elapsed);
        if let Err(error) = self.display.edit(&text).await {
            debug!(%error, "progress update dropped");
        }
    }
}

/// Throttle predicate: render when the elapsed time modulo ten seconds
/// rounds to zero, or when the transfer is complete.
pub fn should_render(elapsed_secs: f64, transferred: u64, total: u64) -> bool {
    transferred == total || (elapsed_secs % 10.0).round() == 0.0
}

fn render_status(label: &str, transferred: u64, total: u64, elapsed_secs: f64) -> String {
    let percentage = transferred as f64 * 100.0 / total as f64;
    let speed = transferred as f64 / elapsed_secs;
    let eta_secs = if speed > 0.0 {
        (total - transferred) as f64 / speed
    } else {
        0.0
    };

    let filled = ((percentage / 5.0).floor() as usize).min(BAR_CELLS);
    let bar = format!(
        "[{}{}]",
        BAR_FILLED.repeat(filled),
        BAR_EMPTY.repeat(BAR_CELLS - filled)
    );

    format!(
        "{label}\n\n{bar} {percentage:.2}%\n{transferred} of {total}\nSpeed: {speed}/s\nElapsed: {elapsed}\nETA: {eta}",
        transferred = humanbytes(transferred),
        total = humanbytes(total),
        speed = humanbytes(speed as u64),
        elapsed = format_duration(elapsed_secs * 1000.0),
        eta = format_duration((elapsed_secs + eta_secs) * 1000.0),
    )
}
