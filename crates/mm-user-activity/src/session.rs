use mattermost_ox::{ErrorKind, Mattermost, Team};
use tracing::info;

use crate::{config::Config, error::Error, paginate::PageScope};

/// An authenticated client plus the resolved team, if one was requested.
#[derive(Debug)]
pub struct Session {
    pub client: Mattermost,
    pub team: Option<Team>,
}

impl Session {
    /// Log in with `token` and resolve `config.team` to its id.
    pub async fn establish(config: &Config, token: &str) -> Result<Self, Error> {
        let client = Mattermost::new(config.base_url(), token);

        let me = client.login().await.map_err(|err| match err.kind() {
            ErrorKind::Auth => Error::Auth(err),
            _ => Error::Transport(err),
        })?;
        info!(
            server = %client.base_url(),
            user = me.username.as_deref().unwrap_or_default(),
            "logged in"
        );

        let team = match config.team.as_deref() {
            Some(slug) => {
                let team = client.get_team_by_name(slug).await.map_err(|err| {
                    match err.kind() {
                        ErrorKind::NotFound => Error::NotFound {
                            what: format!("team `{slug}`"),
                            source: err,
                        },
                        _ => Error::from(err),
                    }
                })?;
                info!(team = %team.name, team_id = %team.id, "resolved team");
                Some(team)
            }
            None => None,
        };

        Ok(Self { client, team })
    }

    /// Page scope for the listing: team-filtered and sorted when a team was
    /// resolved, unscoped otherwise.
    #[must_use]
    pub fn scope(&self, config: &Config) -> PageScope {
        match self.team {
            Some(ref team) => PageScope::team(team.id.clone(), config.sort),
            None => PageScope::unscoped(),
        }
    }
}
