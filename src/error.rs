use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("plugin does not exist")]
    PluginNotExist,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load configuration: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("could not encode configuration: {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("could not read metadata: {}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid plugin name: {0:?}")]
    InvalidName(String),

    #[error("unknown installer")]
    UnknownInstaller,

    #[error("no supported installer")]
    NoInstaller,

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Install(#[from] anyhow::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PluginNotExist)
    }
}

/// Failure of the structured-file encoder/decoder, whichever format is in use.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    TomlDecode(#[from] toml::de::Error),

    #[error(transparent)]
    TomlEncode(#[from] toml::ser::Error),

    #[error("file is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
