use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::stat::safe_stat;
use super::stream::BatchSink;
use crate::path_utils::entry_word;
use crate::types::{Batch, Entry};

/// One directory level to list for a gather.
#[derive(Debug, Clone)]
pub(crate) struct ScanJob {
    pub root: PathBuf,
    pub base_path: PathBuf,
    pub absolute_words: bool,
    pub skip_directories: bool,
    pub batch_size: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanSummary {
    pub entries: usize,
    pub batches: usize,
    pub skipped: usize,
    pub canceled: bool,
}

/// Lists `job.root` in OS order and pushes entries to `sink` in batches of
/// `job.batch_size`. Never fails: unreadable children are skipped and a broken
/// directory stream ends the scan with what was collected so far.
pub(crate) fn scan_directory(job: &ScanJob, sink: &BatchSink) -> ScanSummary {
    let scan_start = Instant::now();
    let mut summary = ScanSummary::default();

    match safe_stat(&job.root) {
        Some(stat) if stat.is_dir => {}
        _ => {
            debug!("SCAN_SKIP: {} is not a directory", job.root.display());
            return summary;
        }
    }

    let read_dir = match fs::read_dir(&job.root) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            error!("SCAN_ERROR: Failed to read {}: {}", job.root.display(), e);
            return summary;
        }
    };

    let batch_size = job.batch_size.max(1);
    let mut batch: Batch = Vec::with_capacity(batch_size.min(1024));

    for dir_entry in read_dir {
        if sink.is_canceled() {
            summary.canceled = true;
            break;
        }

        let dir_entry = match dir_entry {
            Ok(dir_entry) => dir_entry,
            Err(e) => {
                warn!(
                    "SCAN_ABORT: Reading {} failed after {} entries: {}",
                    job.root.display(),
                    summary.entries + batch.len(),
                    e
                );
                break;
            }
        };

        let path = dir_entry.path();
        let Some(stat) = safe_stat(&path) else {
            summary.skipped += 1;
            continue;
        };

        if job.skip_directories && stat.is_dir {
            continue;
        }

        let word = entry_word(&path, &job.base_path, job.absolute_words, stat.is_dir);
        batch.push(Entry::from_stat(path, word, &stat));

        if batch.len() >= batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size.min(1024)));
            let sent = full.len();
            if sink.send(full).is_err() {
                summary.canceled = true;
                break;
            }
            summary.entries += sent;
            summary.batches += 1;
        }
    }

    if !summary.canceled && !batch.is_empty() {
        let sent = batch.len();
        if sink.send(batch).is_err() {
            summary.canceled = true;
        } else {
            summary.entries += sent;
            summary.batches += 1;
        }
    }

    if summary.canceled {
        debug!(
            "SCAN_CANCELED: {} abandoned by consumer after {:?}",
            job.root.display(),
            scan_start.elapsed()
        );
    } else {
        info!(
            "SCAN_DONE: {} entries in {} batches from {} ({} skipped) in {:?}",
            summary.entries,
            summary.batches,
            job.root.display(),
            summary.skipped,
            scan_start.elapsed()
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_source::stream::EntryStream;
    use std::fs::File;
    use std::thread;
    use tempfile::TempDir;

    fn job(dir: &TempDir, batch_size: usize) -> ScanJob {
        ScanJob {
            root: dir.path().to_path_buf(),
            base_path: dir.path().to_path_buf(),
            absolute_words: false,
            skip_directories: false,
            batch_size,
        }
    }

    fn populate(dir: &TempDir, files: usize) {
        for i in 0..files {
            File::create(dir.path().join(format!("file_{i:02}.txt"))).unwrap();
        }
    }

    #[test]
    fn test_batches_follow_read_dir_order() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 7);

        let expected: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();

        let (sink, stream) = EntryStream::channel();
        let job = job(&dir, 3);
        let worker = thread::spawn(move || scan_directory(&job, &sink));

        let batches: Vec<Batch> = stream.collect();
        let summary = worker.join().unwrap();

        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![3, 3, 1]
        );
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.entries, 7);
        assert!(!summary.canceled);

        let words: Vec<String> = batches.into_iter().flatten().map(|e| e.word).collect();
        assert_eq!(words, expected);
    }

    #[test]
    fn test_exact_multiple_emits_no_trailing_batch() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 4);

        let (sink, stream) = EntryStream::channel();
        let job = job(&dir, 2);
        let worker = thread::spawn(move || scan_directory(&job, &sink));

        let sizes: Vec<usize> = stream.map(|batch| batch.len()).collect();
        worker.join().unwrap();
        assert_eq!(sizes, vec![2, 2]);
    }

    #[test]
    fn test_missing_root_emits_nothing() {
        let dir = TempDir::new().unwrap();
        let mut job = job(&dir, 10);
        job.root = dir.path().join("missing");

        let (sink, stream) = EntryStream::channel();
        let worker = thread::spawn(move || scan_directory(&job, &sink));

        assert_eq!(stream.count(), 0);
        assert_eq!(worker.join().unwrap(), ScanSummary::default());
    }

    #[test]
    fn test_skip_directories() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 2);
        fs::create_dir(dir.path().join("nested")).unwrap();

        let mut job = job(&dir, 100);
        job.skip_directories = true;

        let (sink, stream) = EntryStream::channel();
        let worker = thread::spawn(move || scan_directory(&job, &sink));
        let entries: Vec<Entry> = stream.flatten().collect();
        worker.join().unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| !entry.is_dir));
    }

    #[test]
    fn test_abandoned_stream_stops_scan() {
        let dir = TempDir::new().unwrap();
        populate(&dir, 10);

        let (sink, mut stream) = EntryStream::channel();
        let job = job(&dir, 1);
        let worker = thread::spawn(move || scan_directory(&job, &sink));

        assert_eq!(stream.next_batch().map(|batch| batch.len()), Some(1));
        drop(stream);

        let summary = worker.join().unwrap();
        assert!(summary.canceled);
        assert!(summary.batches < 10);
    }
}
