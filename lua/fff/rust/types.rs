use mlua::prelude::*;
use mlua::IntoLua;
use std::path::{Path, PathBuf};

use crate::file_source::stat::FileStat;

pub type Batch = Vec<Entry>;

/// One filesystem object as handed to the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Text the picker matches against: relative or absolute path, directories end with a separator.
    pub word: String,
    /// Overrides `word` for rendering only.
    pub display: Option<String>,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: Option<u64>,
    /// Milliseconds since the Unix epoch.
    pub modified: Option<i64>,
    pub is_tree: bool,
    pub tree_path: Option<PathBuf>,
}

impl Entry {
    #[inline]
    pub fn from_stat(path: PathBuf, word: String, stat: &FileStat) -> Self {
        Self {
            word,
            display: None,
            is_dir: stat.is_dir,
            is_symlink: stat.is_symlink,
            size: stat.size,
            modified: stat.modified_millis(),
            is_tree: stat.is_dir,
            tree_path: Some(path.clone()),
            path,
        }
    }

    /// Placeholder for a file the user is about to create. Nothing is read from disk.
    pub fn new_file(base_path: &Path, input: &str) -> Self {
        Self {
            word: input.to_string(),
            display: Some(format!("[new] {input}")),
            path: base_path.join(input),
            is_dir: false,
            is_symlink: false,
            size: None,
            modified: None,
            is_tree: false,
            tree_path: None,
        }
    }

    pub fn label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.word)
    }
}

impl IntoLua for Entry {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let action = lua.create_table()?;
        action.set("path", self.path.to_string_lossy().to_string())?;
        action.set("isDirectory", self.is_dir)?;
        action.set("isLink", self.is_symlink)?;

        let table = lua.create_table()?;
        table.set("word", self.word)?;
        if let Some(display) = self.display {
            table.set("display", display)?;
        }
        table.set("action", action)?;

        if self.size.is_some() || self.modified.is_some() {
            let status = lua.create_table()?;
            status.set("size", self.size)?;
            status.set("time", self.modified)?;
            table.set("status", status)?;
        }

        table.set("isTree", self.is_tree)?;
        if let Some(tree_path) = self.tree_path {
            table.set("treePath", tree_path.to_string_lossy().to_string())?;
        }
        Ok(LuaValue::Table(table))
    }
}
