#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Export the user accounts of a Mattermost server, optionally restricted
//! to one team, to a comma-space delimited text file for auditing last
//! activity.
//!
//! The run is a single sequential pipeline: validate the command line,
//! open the token and output files, log in, size the export from the
//! server's statistics, page through the users and write them out. Nothing
//! is written until every page has been fetched.

pub mod config;
pub mod error;
pub mod export;
pub mod paginate;
pub mod session;

pub use config::{Config, Resources};
pub use error::{ConfigError, Error};

use std::path::PathBuf;

use tracing::info;

use crate::session::Session;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub rows: usize,
    pub path: PathBuf,
}

/// Run an export described by a validated [`Config`].
pub async fn run(config: &Config) -> Result<Report, Error> {
    let Resources { token, output } = Resources::acquire(config)?;

    let session = Session::establish(config, &token).await?;
    let scope = session.scope(config);

    let users =
        paginate::collect_users(&session.client, &scope, config.num_users, config.page_size)
            .await?;

    let rows = export::write_report(output, &users, &config.null_marker).map_err(|source| {
        Error::Io {
            path: config.out_file.clone(),
            source,
        }
    })?;
    info!(rows, path = %config.out_file.display(), "report written");

    Ok(Report {
        rows,
        path: config.out_file.clone(),
    })
}
