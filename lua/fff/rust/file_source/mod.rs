//! One-level directory source: stat, stream, scan, staleness.

pub mod core;
pub(crate) mod scanner;
pub mod staleness;
pub mod stat;
pub mod stream;

pub use self::core::{FileSource, MAX_BATCH_ITEMS};
pub use staleness::StalenessTracker;
pub use stat::{safe_stat, FileStat};
pub use stream::{BatchPoll, EntryStream};
