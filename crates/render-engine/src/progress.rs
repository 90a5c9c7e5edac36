//! Progress reporting to the host.

use std::cell::Cell;

/// Progress callback for mix rendering.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Render progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// Overall progress in whole percent, `0..=100`. Never decreases within
    /// one render.
    pub percent: u8,

    /// Current stage.
    pub stage: RenderStage,

    /// Short human-readable status line.
    pub message: String,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Probing,
    Planning,
    Rendering,
    Finalizing,
    Complete,
}

/// Share of the bar reserved for staging and probing the uploads; the encode
/// fills the rest.
pub const PREPARE_SHARE: u8 = 40;

/// Forwards reports to an optional callback while keeping the percentage
/// monotonic.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    last_percent: Cell<u8>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            last_percent: Cell::new(0),
        }
    }

    /// Report `percent` (clamped to 100 and to the last reported value).
    pub fn report(&self, percent: u8, stage: RenderStage, message: impl Into<String>) {
        let percent = percent.min(100).max(self.last_percent.get());
        self.last_percent.set(percent);
        if let Some(cb) = &self.callback {
            cb(RenderProgress {
                percent,
                stage,
                message: message.into(),
            });
        }
    }

    /// Report a fraction of the span `[from, to]` percent.
    pub fn report_span(
        &self,
        from: u8,
        to: u8,
        fraction: f64,
        stage: RenderStage,
        message: impl Into<String>,
    ) {
        self.report(span_percent(from, to, fraction), stage, message);
    }

    /// Last percentage handed to the host.
    pub fn last_percent(&self) -> u8 {
        self.last_percent.get()
    }
}

/// Map `fraction` of the way through `[from, to]` to a whole percentage.
pub fn span_percent(from: u8, to: u8, fraction: f64) -> u8 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (from, to) = (from.min(100) as f64, to.min(100) as f64);
    (from + (to - from).max(0.0) * fraction).floor() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (ProgressReporter, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ProgressReporter::new(Some(Box::new(move |p: RenderProgress| {
            sink.lock().unwrap().push(p.percent);
        })));
        (reporter, seen)
    }

    #[test]
    fn test_reports_never_decrease() {
        let (reporter, seen) = recorder();
        reporter.report(10, RenderStage::Probing, "a");
        reporter.report(5, RenderStage::Probing, "b");
        reporter.report(250, RenderStage::Complete, "c");
        assert_eq!(*seen.lock().unwrap(), vec![10, 10, 100]);
        assert_eq!(reporter.last_percent(), 100);
    }

    #[test]
    fn test_span_percent() {
        assert_eq!(span_percent(0, 40, 0.5), 20);
        assert_eq!(span_percent(40, 100, 0.0), 40);
        assert_eq!(span_percent(40, 100, 1.0), 100);
        assert_eq!(span_percent(40, 100, 2.0), 100);
        assert_eq!(span_percent(40, 100, f64::NAN), 40);
        assert_eq!(span_percent(0, 40, 1.0 / 3.0), 13);
    }

    #[test]
    fn test_without_callback() {
        let reporter = ProgressReporter::new(None);
        reporter.report_span(0, 40, 1.0, RenderStage::Probing, "probed");
        assert_eq!(reporter.last_percent(), 40);
    }
}
