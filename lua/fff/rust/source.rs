//! The contract between the picker host and a source of entries.
//!
//! A source is constructed once per picker source instance and then driven by
//! the host through three calls: `params` to obtain defaults, `gather` to
//! stream entries for the current input, and `check_updated` to decide whether
//! a cached listing went stale.

use crate::error::Error;
use crate::file_source::EntryStream;
use crate::path_utils::TreePath;

/// Services the host provides to a source.
pub trait Host {
    /// Directory to fall back to when no path option is configured.
    fn current_path(&self) -> Result<String, Error>;

    /// Shows a message to the user. Failures are the host's concern.
    fn print_error(&self, message: &str);
}

pub trait Source {
    type Params: Default + Clone;

    fn params(&self) -> Self::Params;

    fn gather(&mut self, host: &dyn Host, args: GatherArgs<Self::Params>) -> EntryStream;

    fn check_updated(&mut self, host: &dyn Host, options: &SourceOptions) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceOptions {
    pub path: TreePath,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileParams {
    /// Offer the input as the name of a file to create instead of listing.
    pub new: bool,
    pub skip_directories: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GatherArgs<P> {
    pub options: SourceOptions,
    pub params: P,
    pub input: String,
}

impl<P: Default> GatherArgs<P> {
    pub fn new(path: impl Into<TreePath>, input: impl Into<String>) -> Self {
        Self {
            options: SourceOptions { path: path.into() },
            params: P::default(),
            input: input.into(),
        }
    }

    pub fn with_params(mut self, params: P) -> Self {
        self.params = params;
        self
    }
}
