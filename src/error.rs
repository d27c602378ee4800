use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no registered handler for mime type \"{0}\"")]
    NoSuchMimeType(String),

    #[error("no registered handler for url type \"{0}:\"")]
    NoSuchScheme(String),

    #[error("no handler explicitly defined for \"{name}\" / {extensions:?}")]
    NoHandlerDefined {
        name: String,
        extensions: Vec<String>,
    },

    #[error("unknown action {0}")]
    UnknownAction(String),

    #[error("unknown action name \"{0}\"")]
    UnknownActionName(String),

    #[error("unable to run \"{url}\" with no associated application or webservice uri to call")]
    Unconfigured { url: String },

    #[error("no %s in uri template \"{template}\"")]
    MalformedTemplate { template: String },

    #[error("no mime type specified")]
    MimeRequired,

    #[error("unknown file extension for \"{path}\"")]
    UnknownExtension { path: String },

    #[error("name collision in {table}: \"{key}\"")]
    DuplicateKey { table: &'static str, key: String },

    #[error("registry has no backing file to save to")]
    NoBackingFile,

    #[error("no browser profiles found in \"{}\"", .dir.display())]
    NoProfileFound { dir: PathBuf },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to launch \"{command}\": {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Payload-free classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoSuchMimeType,
    NoSuchScheme,
    NoHandlerDefined,
    UnknownAction,
    UnknownActionName,
    Unconfigured,
    MalformedTemplate,
    MimeRequired,
    UnknownExtension,
    DuplicateKey,
    NoBackingFile,
    NoProfileFound,
    Io,
    Spawn,
    Json,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoSuchMimeType(_) => ErrorKind::NoSuchMimeType,
            Error::NoSuchScheme(_) => ErrorKind::NoSuchScheme,
            Error::NoHandlerDefined { .. } => ErrorKind::NoHandlerDefined,
            Error::UnknownAction(_) => ErrorKind::UnknownAction,
            Error::UnknownActionName(_) => ErrorKind::UnknownActionName,
            Error::Unconfigured { .. } => ErrorKind::Unconfigured,
            Error::MalformedTemplate { .. } => ErrorKind::MalformedTemplate,
            Error::MimeRequired => ErrorKind::MimeRequired,
            Error::UnknownExtension { .. } => ErrorKind::UnknownExtension,
            Error::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Error::NoBackingFile => ErrorKind::NoBackingFile,
            Error::NoProfileFound { .. } => ErrorKind::NoProfileFound,
            Error::Io { .. } => ErrorKind::Io,
            Error::Spawn { .. } => ErrorKind::Spawn,
            Error::Json(_) => ErrorKind::Json,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
