use std::path::Path;
use std::thread;
use std::time::SystemTime;
use tracing::{debug, error, info};

use super::scanner::{scan_directory, ScanJob};
use super::stat::safe_stat;
use super::staleness::StalenessTracker;
use super::stream::EntryStream;
use crate::path_utils::{is_absolute_input, normalize_lexically, resolve_base_path, scan_root};
use crate::source::{FileParams, GatherArgs, Host, Source, SourceOptions};
use crate::types::Entry;

pub const MAX_BATCH_ITEMS: usize = 20_000;

/// Lists one directory level per gather and tracks whether it went stale.
#[derive(Debug)]
pub struct FileSource {
    staleness: StalenessTracker,
    batch_size: usize,
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSource {
    pub fn new() -> Self {
        Self {
            staleness: StalenessTracker::new(),
            batch_size: MAX_BATCH_ITEMS,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn last_seen(&self) -> Option<SystemTime> {
        self.staleness.last_seen()
    }

    fn spawn_scan(&self, job: ScanJob) -> EntryStream {
        let (sink, stream) = EntryStream::channel();
        let root = job.root.clone();

        let spawned = thread::Builder::new()
            .name("fff-gather".to_string())
            .spawn(move || {
                scan_directory(&job, &sink);
            });

        match spawned {
            Ok(_) => stream,
            Err(e) => {
                error!("GATHER_ERROR: Failed to spawn scan of {}: {}", root.display(), e);
                EntryStream::empty()
            }
        }
    }
}

impl Source for FileSource {
    type Params = FileParams;

    fn params(&self) -> FileParams {
        FileParams::default()
    }

    fn gather(&mut self, host: &dyn Host, args: GatherArgs<FileParams>) -> EntryStream {
        let started = SystemTime::now();

        let base_path = match resolve_base_path(&args.options.path, host) {
            Ok(path) => path,
            Err(e) => {
                error!("GATHER_ERROR: Cannot resolve base path: {}", e);
                return EntryStream::empty();
            }
        };
        info!(
            "GATHER_START: base={} input='{}' new={}",
            base_path.display(),
            args.input,
            args.params.new
        );

        if args.params.new {
            self.staleness.mark_gathered(started);
            if args.input.is_empty() {
                return EntryStream::empty();
            }
            return EntryStream::from_batch(vec![Entry::new_file(&base_path, &args.input)]);
        }

        let root = scan_root(&base_path, &args.input);
        let Some(stat) = safe_stat(&base_path) else {
            host.print_error(&crate::error::Error::NotFound(display(&root)).to_string());
            return EntryStream::empty();
        };

        if !stat.is_dir {
            self.staleness.mark_gathered(started);
            debug!("GATHER_FILE: {} is not a directory", base_path.display());
            let word = display(&base_path);
            return EntryStream::from_batch(vec![Entry::from_stat(base_path, word, &stat)]);
        }

        // Later checks compare mtimes, so the baseline comes from the same clock.
        match stat.modified {
            Some(modified) => self.staleness.record_mtime(modified, started),
            None => self.staleness.mark_gathered(started),
        }

        let job = ScanJob {
            root,
            absolute_words: is_absolute_input(&args.input),
            skip_directories: args.params.skip_directories,
            batch_size: self.batch_size,
            base_path: normalize_lexically(&base_path),
        };
        self.spawn_scan(job)
    }

    fn check_updated(&mut self, host: &dyn Host, options: &SourceOptions) -> bool {
        match resolve_base_path(&options.path, host) {
            Ok(dir) => self.staleness.check(&dir),
            Err(e) => {
                debug!("STALE_CHECK: Cannot resolve base path: {}", e);
                false
            }
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
