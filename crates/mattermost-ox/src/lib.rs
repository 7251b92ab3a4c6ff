#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Minimal client for the Mattermost REST API v4: token login, team lookup,
//! user and team statistics, and paged user listings.

pub mod client;
pub mod error;
mod internal;
pub mod teams;
pub mod timestamp;
pub mod users;

// Re-export main types
pub use client::Mattermost;
pub use error::{ErrorKind, MattermostRequestError};
pub use teams::{Team, TeamStats};
pub use timestamp::Timestamp;
pub use users::{PER_PAGE_MAXIMUM, User, UserListParams, UserSort, UserStats};
