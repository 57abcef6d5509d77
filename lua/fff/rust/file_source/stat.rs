use chrono::{DateTime, Utc};
use std::fs::{self, Metadata};
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl FileStat {
    fn from_metadata(metadata: &Metadata, is_symlink: bool) -> Self {
        Self {
            is_dir: metadata.is_dir(),
            is_symlink,
            size: Some(metadata.len()),
            modified: metadata.modified().ok(),
        }
    }

    pub fn modified_millis(&self) -> Option<i64> {
        self.modified
            .map(|time| DateTime::<Utc>::from(time).timestamp_millis())
    }
}

/// Symlink-aware stat: `lstat` first, then follow the link for type, size and
/// mtime. A link whose target cannot be read is still reported as a symlink,
/// with no size or mtime. `None` only when the path itself cannot be read.
pub fn safe_stat(path: &Path) -> Option<FileStat> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            trace!("STAT_SKIP: {}: {}", path.display(), e);
            return None;
        }
    };

    if !metadata.file_type().is_symlink() {
        return Some(FileStat::from_metadata(&metadata, false));
    }

    match fs::metadata(path) {
        Ok(target) => Some(FileStat::from_metadata(&target, true)),
        Err(e) => {
            trace!("STAT_DANGLING: {}: {}", path.display(), e);
            Some(FileStat {
                is_dir: false,
                is_symlink: true,
                size: None,
                modified: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_regular_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("data.bin");
        File::create(&file_path).unwrap().write_all(&[0u8; 42]).unwrap();

        let file = safe_stat(&file_path).unwrap();
        assert!(!file.is_dir);
        assert!(!file.is_symlink);
        assert_eq!(file.size, Some(42));
        assert!(file.modified_millis().is_some());

        let directory = safe_stat(dir.path()).unwrap();
        assert!(directory.is_dir);
        assert!(!directory.is_symlink);
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(safe_stat(&dir.path().join("gone")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_reports_target_metadata() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.txt");
        File::create(&target).unwrap().write_all(b"hello").unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let stat = safe_stat(&link).unwrap();
        assert!(stat.is_symlink);
        assert!(!stat.is_dir);
        assert_eq!(stat.size, Some(5));

        let dir_link = dir.path().join("self");
        std::os::unix::fs::symlink(dir.path(), &dir_link).unwrap();
        let stat = safe_stat(&dir_link).unwrap();
        assert!(stat.is_symlink);
        assert!(stat.is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_keeps_flag() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();

        let stat = safe_stat(&link).unwrap();
        assert!(stat.is_symlink);
        assert!(!stat.is_dir);
        assert_eq!(stat.size, None);
        assert_eq!(stat.modified, None);
    }
}
