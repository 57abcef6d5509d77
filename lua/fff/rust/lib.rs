//! Directory source for the fff picker.
//!
//! Lists a single directory level as a stream of entry batches and answers
//! whether that directory changed since it was last listed. The Rust side is
//! loaded by Neovim as the `fff_browser` Lua module; see [`lua_api`].

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod error;
pub mod file_source;
pub mod log;
pub mod lua_api;
pub mod path_utils;
pub mod source;
pub mod types;

pub use error::Error;
pub use file_source::{BatchPoll, EntryStream, FileSource, StalenessTracker, MAX_BATCH_ITEMS};
pub use path_utils::TreePath;
pub use source::{FileParams, GatherArgs, Host, Source, SourceOptions};
pub use types::{Batch, Entry};

#[cfg(feature = "module")]
#[mlua::lua_module(skip_memory_check)]
fn fff_browser(lua: &mlua::Lua) -> mlua::Result<mlua::Table> {
    lua_api::create_module(lua)
}
