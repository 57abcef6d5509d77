use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{0} is not found")]
    NotFound(String),

    #[error("Host call failed: {0}")]
    Host(String),

    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),
}

impl From<Error> for mlua::Error {
    fn from(err: Error) -> Self {
        mlua::Error::external(err)
    }
}

impl From<mlua::Error> for Error {
    fn from(err: mlua::Error) -> Self {
        Error::Host(err.to_string())
    }
}
