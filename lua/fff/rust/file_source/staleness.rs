use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

use super::stat::safe_stat;

/// Filesystem mtimes come from a coarse clock; younger ones may share a tick
/// with a change that lands right after them.
const MTIME_SETTLE: Duration = Duration::from_millis(10);

/// Remembers when a source last looked at its directory.
///
/// One tracker per source instance; the baseline is only reachable through
/// `mark_gathered`, `record_mtime` and `check`.
#[derive(Debug, Default, Clone)]
pub struct StalenessTracker {
    last_seen: Option<SystemTime>,
}

impl StalenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<SystemTime> {
        self.last_seen
    }

    pub fn mark_gathered(&mut self, started: SystemTime) {
        self.last_seen = Some(started);
    }

    /// Baseline from the directory's own mtime, as stat'ed at `observed_at`.
    /// An unsettled mtime leaves the baseline unset so the next check reports
    /// a change.
    pub fn record_mtime(&mut self, modified: SystemTime, observed_at: SystemTime) {
        let settled = observed_at
            .duration_since(modified)
            .is_ok_and(|age| age >= MTIME_SETTLE);
        self.last_seen = settled.then_some(modified);
    }

    /// True when `dir` was modified after the baseline. Advances the baseline
    /// to the observed mtime; leaves it alone when `dir` cannot be inspected.
    pub fn check(&mut self, dir: &Path) -> bool {
        let modified = match safe_stat(dir) {
            Some(stat) if stat.is_dir => stat.modified,
            _ => None,
        };

        let Some(modified) = modified else {
            debug!("STALE_CHECK: {} cannot be inspected", dir.display());
            return false;
        };

        // Never observed compares lower than any mtime.
        let changed = Some(modified) > self.last_seen;
        self.last_seen = Some(modified);

        debug!("STALE_CHECK: {} changed = {}", dir.display(), changed);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_first_check_reports_change_once() {
        let dir = TempDir::new().unwrap();
        let mut tracker = StalenessTracker::new();

        assert!(tracker.check(dir.path()));
        assert!(!tracker.check(dir.path()));
        assert!(!tracker.check(dir.path()));
    }

    #[test]
    fn test_unchanged_after_gather() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("existing")).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let mut tracker = StalenessTracker::new();
        tracker.mark_gathered(SystemTime::now());
        assert!(!tracker.check(dir.path()));
    }

    #[test]
    fn test_mutation_after_gather_is_seen_once() {
        let dir = TempDir::new().unwrap();
        let mut tracker = StalenessTracker::new();
        tracker.mark_gathered(SystemTime::now());

        std::thread::sleep(Duration::from_millis(50));
        File::create(dir.path().join("new_file")).unwrap();

        assert!(tracker.check(dir.path()));
        assert!(!tracker.check(dir.path()));
    }

    #[test]
    fn test_recorded_mtime_catches_immediate_mutation() {
        let dir = TempDir::new().unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let mut tracker = StalenessTracker::new();
        let observed = safe_stat(dir.path()).unwrap().modified.unwrap();
        tracker.record_mtime(observed, SystemTime::now());
        assert_eq!(tracker.last_seen(), Some(observed));
        assert!(!tracker.check(dir.path()));

        File::create(dir.path().join("right_after")).unwrap();
        assert!(tracker.check(dir.path()));
        assert!(!tracker.check(dir.path()));
    }

    #[test]
    fn test_fresh_mtime_reports_change_once() {
        let dir = TempDir::new().unwrap();
        let mut tracker = StalenessTracker::new();
        let observed = safe_stat(dir.path()).unwrap().modified.unwrap();
        tracker.record_mtime(observed, observed);

        assert_eq!(tracker.last_seen(), None);
        assert!(tracker.check(dir.path()));
        assert!(!tracker.check(dir.path()));
    }

    #[test]
    fn test_missing_or_file_leaves_baseline() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let mut tracker = StalenessTracker::new();
        let started = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        tracker.mark_gathered(started);

        assert!(!tracker.check(&dir.path().join("missing")));
        assert!(!tracker.check(&file));
        assert_eq!(tracker.last_seen(), Some(started));
    }

    #[test]
    fn test_trackers_are_independent() {
        let dir = TempDir::new().unwrap();
        let mut first = StalenessTracker::new();
        let mut second = StalenessTracker::new();

        assert!(first.check(dir.path()));
        assert!(second.check(dir.path()));
        assert!(!first.check(dir.path()));
    }
}
