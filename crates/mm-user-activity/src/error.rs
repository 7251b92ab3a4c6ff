use std::path::PathBuf;

use mattermost_ox::{ErrorKind, MattermostRequestError};
use thiserror::Error;

/// Invalid command line input or unusable local files. Always raised before
/// the first request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Rejected by the argument parser; carries clap's usage message
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("invalid --siteurl `{siteurl}`: {reason}")]
    InvalidSiteUrl { siteurl: String, reason: String },

    #[error("invalid --port {0}: must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("token file {0} does not exist")]
    TokenFileMissing(PathBuf),

    #[error("token file {0} is not a regular file")]
    TokenFileNotAFile(PathBuf),

    #[error("cannot read token file {path}")]
    TokenFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token file {0} does not contain a token on its first line")]
    EmptyToken(PathBuf),

    #[error("output file {0} already exists, refusing to overwrite it")]
    OutputExists(PathBuf),

    #[error("cannot create output file {path}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid --pagesize {0}: must be positive")]
    InvalidPageSize(u32),

    #[error("invalid --pagesize {size}: the server returns at most {max} users per page")]
    PageSizeTooLarge { size: u32, max: u32 },

    #[error("invalid --team `{0}`: expected a URL-friendly team name (letters, digits, `-`, `_`)")]
    InvalidTeamName(String),

    #[error("invalid --num_users {0}: must be positive")]
    InvalidUserCap(u64),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The server rejected the token
    #[error("authentication rejected")]
    Auth(#[source] MattermostRequestError),

    #[error("{what} not found")]
    NotFound {
        what: String,
        #[source]
        source: MattermostRequestError,
    },

    /// Any other failed API call
    #[error("request to the server failed")]
    Transport(#[source] MattermostRequestError),

    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<MattermostRequestError> for Error {
    fn from(err: MattermostRequestError) -> Self {
        match err.kind() {
            ErrorKind::Auth => Self::Auth(err),
            ErrorKind::NotFound => Self::NotFound {
                what: "resource".to_string(),
                source: err,
            },
            ErrorKind::Transport => Self::Transport(err),
        }
    }
}
