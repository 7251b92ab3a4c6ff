use bon::Builder;
use core::fmt;

use crate::{
    error::MattermostRequestError,
    internal::{Endpoint, RequestBuilder},
    teams::{Team, TeamStats},
    users::{User, UserListParams, UserStats},
};

const API_PREFIX: &str = "api/v4";

/// Client for the Mattermost REST API v4, authenticated with a personal
/// access token.
#[derive(Clone, Builder)]
pub struct Mattermost {
    /// Server root, e.g. `https://chat.example.com:443`.
    #[builder(into)]
    pub(crate) base_url: String,
    #[builder(into)]
    pub(crate) token: String,
    #[builder(default)]
    pub(crate) client: reqwest::Client,
}

impl Mattermost {
    /// Create a new client for `base_url` using `token` as bearer credential.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_builder(&self) -> RequestBuilder<'_> {
        RequestBuilder::new(&self.client, &self.base_url, &self.token)
    }

    async fn api_request<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<T, MattermostRequestError> {
        self.request_builder().request(&endpoint).await
    }

    /// Validates the token by fetching the account it belongs to.
    ///
    /// Personal access tokens need no session exchange, so a successful
    /// `users/me` lookup is what logging in amounts to.
    pub async fn login(&self) -> Result<User, MattermostRequestError> {
        let me: User = self
            .api_request(Endpoint::get(format!("{API_PREFIX}/users/me")))
            .await?;
        tracing::debug!(username = ?me.username, "authenticated");
        Ok(me)
    }

    /// Looks a team up by its URL-friendly name.
    pub async fn get_team_by_name(&self, name: &str) -> Result<Team, MattermostRequestError> {
        self.api_request(Endpoint::get(format!("{API_PREFIX}/teams/name/{name}")))
            .await
    }

    /// Server wide user statistics.
    pub async fn get_stats(&self) -> Result<UserStats, MattermostRequestError> {
        self.api_request(Endpoint::get(format!("{API_PREFIX}/users/stats")))
            .await
    }

    /// Member statistics of a single team.
    pub async fn get_team_stats(&self, team_id: &str) -> Result<TeamStats, MattermostRequestError> {
        self.api_request(Endpoint::get(format!("{API_PREFIX}/teams/{team_id}/stats")))
            .await
    }

    /// Fetches one page of users.
    pub async fn get_users(
        &self,
        params: &UserListParams,
    ) -> Result<Vec<User>, MattermostRequestError> {
        let endpoint =
            Endpoint::get(format!("{API_PREFIX}/users")).with_query_params(params.to_query());
        self.api_request(endpoint).await
    }
}

impl fmt::Debug for Mattermost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mattermost")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("client", &self.client)
            .finish()
    }
}
