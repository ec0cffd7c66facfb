//! Throttled progress publication over a `tokio::sync::watch` channel.

use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

/// Latest known position of a running search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub current_path: String,
    /// Files and folders examined so far.
    pub scanned: usize,
    /// Distinct records matched so far.
    pub matched: usize,
}

#[derive(Debug)]
pub struct ProgressReporter {
    sender: watch::Sender<ProgressSnapshot>,
    interval: Duration,
    last_publish: Mutex<Option<Instant>>,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> (Self, watch::Receiver<ProgressSnapshot>) {
        let (sender, receiver) = watch::channel(ProgressSnapshot::default());
        let reporter = Self {
            sender,
            interval,
            last_publish: Mutex::new(None),
        };
        (reporter, receiver)
    }

    /// A reporter nobody listens to.
    pub fn noop() -> Self {
        Self::new(Duration::MAX).0
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.sender.subscribe()
    }

    /// Publishes unless the previous publication is younger than the interval.
    pub fn report(&self, current_path: &Path, scanned: usize, matched: usize) {
        let now = Instant::now();
        {
            let mut last = self.last_publish.lock();
            if let Some(previous) = *last {
                if now.duration_since(previous) < self.interval {
                    return;
                }
            }
            *last = Some(now);
        }
        self.sender.send_replace(ProgressSnapshot {
            current_path: current_path.to_string_lossy().into_owned(),
            scanned,
            matched,
        });
    }

    /// Publishes the final counters regardless of the interval.
    pub fn finish(&self, scanned: usize, matched: usize) {
        *self.last_publish.lock() = Some(Instant::now());
        self.sender.send_modify(|snapshot| {
            snapshot.scanned = scanned;
            snapshot.matched = matched;
        });
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.sender.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_are_throttled() {
        let (reporter, receiver) = ProgressReporter::new(Duration::from_secs(3600));

        reporter.report(Path::new("/data/a.txt"), 1, 0);
        reporter.report(Path::new("/data/b.txt"), 2, 1);

        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.current_path, "/data/a.txt");
        assert_eq!(snapshot.scanned, 1);
    }

    #[test]
    fn zero_interval_publishes_everything() {
        let (reporter, receiver) = ProgressReporter::new(Duration::ZERO);

        reporter.report(Path::new("/data/a.txt"), 1, 0);
        reporter.report(Path::new("/data/b.txt"), 2, 1);

        assert_eq!(receiver.borrow().current_path, "/data/b.txt");
        assert_eq!(receiver.borrow().matched, 1);
    }

    #[test]
    fn finish_bypasses_throttle() {
        let (reporter, receiver) = ProgressReporter::new(Duration::from_secs(3600));
        reporter.report(Path::new("/data/a.txt"), 1, 0);
        reporter.finish(42, 7);

        let snapshot = receiver.borrow().clone();
        assert_eq!(snapshot.current_path, "/data/a.txt");
        assert_eq!(snapshot.scanned, 42);
        assert_eq!(snapshot.matched, 7);
        assert_eq!(reporter.snapshot(), snapshot);
    }

    #[test]
    fn noop_reporter_accepts_reports() {
        let reporter = ProgressReporter::noop();
        reporter.report(Path::new("/data/a.txt"), 1, 0);
        reporter.finish(1, 0);
        assert_eq!(reporter.snapshot().scanned, 1);
    }
}
