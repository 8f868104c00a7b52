use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SbError {
    #[error("config file not found at {} (run 'sb install' to create it): {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("repo field is required in config file {} (run 'sb install' to set it)", path.display())]
    MissingRepo { path: PathBuf },

    #[error("error rendering config file: {source}")]
    ConfigRender {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown alias: {0}")]
    UnknownAlias(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("invalid repo path {path}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("repository directory does not exist: {}", .0.display())]
    RepoMissing(PathBuf),

    #[error("repository path is not a directory: {}", .0.display())]
    RepoNotDirectory(PathBuf),

    #[error("failed to launch {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("{context}: {source}")]
    Install {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("detected shell wrapper; run 'command sb install' or pass --yes/--dir/--repo/--editor to avoid prompts")]
    WrapperInstall,
}

impl SbError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SbError::WrapperInstall => 2,
            _ => 1,
        }
    }

    pub(crate) fn install(context: impl Into<String>, source: std::io::Error) -> Self {
        SbError::Install {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SbError>;
