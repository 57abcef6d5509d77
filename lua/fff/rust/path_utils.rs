use std::path::{is_separator, Component, Path, PathBuf, MAIN_SEPARATOR};

use crate::error::Error;
use crate::source::Host;

/// Host-side address of a node in the picker's tree view.
///
/// The picker hands us either a plain path or the list of segments leading to
/// an expanded node; both normalize to one filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreePath {
    Path(String),
    Segments(Vec<String>),
}

impl Default for TreePath {
    fn default() -> Self {
        TreePath::Path(String::new())
    }
}

impl TreePath {
    pub fn is_empty(&self) -> bool {
        match self {
            TreePath::Path(path) => path.is_empty(),
            TreePath::Segments(segments) => segments.iter().all(String::is_empty),
        }
    }

    pub fn to_filename(&self) -> PathBuf {
        match self {
            TreePath::Path(path) => PathBuf::from(path),
            TreePath::Segments(segments) => segments
                .iter()
                .filter(|segment| !segment.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for TreePath {
    fn from(path: &str) -> Self {
        TreePath::Path(path.to_string())
    }
}

impl From<String> for TreePath {
    fn from(path: String) -> Self {
        TreePath::Path(path)
    }
}

impl From<&Path> for TreePath {
    fn from(path: &Path) -> Self {
        TreePath::Path(path.to_string_lossy().into_owned())
    }
}

/// Explicit path option wins, otherwise the host decides (cwd or the buffer's directory).
pub fn resolve_base_path(option: &TreePath, host: &dyn Host) -> Result<PathBuf, Error> {
    if !option.is_empty() {
        return Ok(option.to_filename());
    }

    let current = host.current_path()?;
    if current.is_empty() {
        return Err(Error::InvalidPath("host reported an empty current path".to_string()));
    }
    Ok(PathBuf::from(current))
}

#[inline]
pub fn is_absolute_input(input: &str) -> bool {
    Path::new(input).is_absolute()
}

/// Directory actually listed for `input`: typing `src/fo` narrows the listing to `src/`.
pub fn scan_root(base_path: &Path, input: &str) -> PathBuf {
    let Some(pos) = input.rfind(is_separator) else {
        return normalize_lexically(base_path);
    };

    let head = &input[..pos];
    if is_absolute_input(input) {
        if head.is_empty() {
            // "/foo" narrows to the filesystem root itself.
            return PathBuf::from(&input[..pos + 1]);
        }
        return normalize_lexically(Path::new(head));
    }

    normalize_lexically(&base_path.join(head))
}

/// Folds `.` and `..` without touching the filesystem. `..` above the root is
/// dropped; leading `..` of a relative path is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

pub fn entry_word(path: &Path, base_path: &Path, absolute: bool, is_dir: bool) -> String {
    let mut word = if absolute {
        path.to_string_lossy().into_owned()
    } else {
        pathdiff::diff_paths(path, base_path)
            .unwrap_or_else(|| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    };

    if is_dir {
        word.push(MAIN_SEPARATOR);
    }
    word
}
