use mlua::prelude::*;
use mlua::{FromLua, IntoLua, UserData, UserDataMethods};
use tracing::error;

use crate::error::Error;
use crate::file_source::{BatchPoll, EntryStream, FileSource};
use crate::path_utils::TreePath;
use crate::source::{FileParams, GatherArgs, Host, Source, SourceOptions};

/// Host backed by the running Neovim instance.
pub struct LuaHost<'lua> {
    lua: &'lua Lua,
    context_path: Option<String>,
}

impl<'lua> LuaHost<'lua> {
    pub fn new(lua: &'lua Lua, context_path: Option<String>) -> Self {
        Self { lua, context_path }
    }

    fn vim(&self) -> LuaResult<LuaTable> {
        self.lua.globals().get("vim")
    }

    fn notify_error(&self, message: &str) -> LuaResult<()> {
        let vim = self.vim()?;
        let notify: LuaFunction = vim.get("notify")?;
        let log: LuaTable = vim.get("log")?;
        let levels: LuaTable = log.get("levels")?;
        let level: LuaValue = levels.get("ERROR")?;
        notify.call::<()>((message, level))
    }
}

impl Host for LuaHost<'_> {
    fn current_path(&self) -> Result<String, Error> {
        if let Some(path) = self.context_path.as_ref().filter(|path| !path.is_empty()) {
            return Ok(path.clone());
        }

        let functions: LuaTable = self.vim()?.get("fn")?;
        let getcwd: LuaFunction = functions.get("getcwd")?;
        Ok(getcwd.call::<String>(())?)
    }

    fn print_error(&self, message: &str) {
        if let Err(e) = self.notify_error(message) {
            error!("Failed to report '{}' to the editor: {}", message, e);
        }
    }
}

impl FromLua for TreePath {
    fn from_lua(value: LuaValue, lua: &Lua) -> LuaResult<Self> {
        match value {
            LuaValue::Nil => Ok(TreePath::default()),
            LuaValue::Table(table) => Ok(TreePath::Segments(
                table.sequence_values::<String>().collect::<LuaResult<_>>()?,
            )),
            other => Ok(TreePath::Path(String::from_lua(other, lua)?)),
        }
    }
}

impl FromLua for SourceOptions {
    fn from_lua(value: LuaValue, _lua: &Lua) -> LuaResult<Self> {
        match value {
            LuaValue::Nil => Ok(SourceOptions::default()),
            LuaValue::Table(table) => Ok(SourceOptions {
                path: table.get("path")?,
            }),
            other => Err(LuaError::RuntimeError(format!(
                "SourceOptions: expected a table, got {}",
                other.type_name()
            ))),
        }
    }
}

impl FromLua for FileParams {
    fn from_lua(value: LuaValue, _lua: &Lua) -> LuaResult<Self> {
        match value {
            LuaValue::Nil => Ok(FileParams::default()),
            LuaValue::Table(table) => Ok(FileParams {
                new: table.get::<Option<bool>>("new")?.unwrap_or(false),
                skip_directories: table
                    .get::<Option<bool>>("skip_directories")?
                    .unwrap_or(false),
            }),
            other => Err(LuaError::RuntimeError(format!(
                "FileParams: expected a table, got {}",
                other.type_name()
            ))),
        }
    }
}

impl IntoLua for FileParams {
    fn into_lua(self, lua: &Lua) -> LuaResult<LuaValue> {
        let table = lua.create_table()?;
        table.set("new", self.new)?;
        table.set("skip_directories", self.skip_directories)?;
        Ok(LuaValue::Table(table))
    }
}

/// `{ options = {...}, params = {...}, input = "", context = { path = "" } }`
#[derive(Default)]
struct GatherRequest {
    args: GatherArgs<FileParams>,
    context_path: Option<String>,
}

impl FromLua for GatherRequest {
    fn from_lua(value: LuaValue, _lua: &Lua) -> LuaResult<Self> {
        let table = match value {
            LuaValue::Nil => return Ok(Self::default()),
            LuaValue::Table(table) => table,
            other => {
                return Err(LuaError::RuntimeError(format!(
                    "GatherRequest: expected a table, got {}",
                    other.type_name()
                )))
            }
        };

        let context_path = match table.get::<Option<LuaTable>>("context")? {
            Some(context) => context.get::<Option<String>>("path")?,
            None => None,
        };

        Ok(Self {
            args: GatherArgs {
                options: table.get("options")?,
                params: table.get("params")?,
                input: table.get::<Option<String>>("input")?.unwrap_or_default(),
            },
            context_path,
        })
    }
}

pub struct LuaFileSource(pub FileSource);

impl UserData for LuaFileSource {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("params", |_, this, ()| Ok(this.0.params()));

        methods.add_method_mut("gather", |lua, this, request: GatherRequest| {
            let host = LuaHost::new(lua, request.context_path);
            Ok(LuaEntryStream(this.0.gather(&host, request.args)))
        });

        methods.add_method_mut("check_updated", |lua, this, options: SourceOptions| {
            let host = LuaHost::new(lua, None);
            Ok(this.0.check_updated(&host, &options))
        });
    }
}

pub struct LuaEntryStream(pub EntryStream);

impl UserData for LuaEntryStream {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_method_mut("next", |_, this, ()| Ok(this.0.next_batch()));

        // Non-blocking variant for timers: (batch | nil, done)
        methods.add_method_mut("poll", |_, this, ()| {
            Ok(match this.0.poll() {
                BatchPoll::Ready(batch) => (Some(batch), false),
                BatchPoll::Pending => (None, false),
                BatchPoll::Done => (None, true),
            })
        });

        methods.add_method_mut("cancel", |_, this, ()| {
            this.0.cancel();
            Ok(())
        });
    }
}

pub fn create_module(lua: &Lua) -> LuaResult<LuaTable> {
    let exports = lua.create_table()?;

    exports.set(
        "new_source",
        lua.create_function(|_, ()| Ok(LuaFileSource(FileSource::new())))?,
    )?;

    exports.set(
        "init_tracing",
        lua.create_function(|_, (log_file, level): (String, Option<String>)| {
            Ok(crate::log::init_tracing(&log_file, level.as_deref())?)
        })?,
    )?;

    Ok(exports)
}
