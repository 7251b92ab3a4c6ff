use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::Timestamp;

/// A user account as returned by `GET /api/v4/users`.
///
/// Every field is optional: the server omits fields depending on the
/// caller's permissions and on server version, and an omitted field is not
/// an error. Fields the client does not model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub create_at: Option<Timestamp>,
    #[serde(default)]
    pub update_at: Option<Timestamp>,
    #[serde(default)]
    pub delete_at: Option<Timestamp>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Space separated role names, e.g. `"system_user system_admin"`.
    #[serde(default)]
    pub roles: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub auth_service: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub last_activity_at: Option<Timestamp>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `GET /api/v4/users/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users_count: u64,
}

/// Sort orders the server accepts for team-scoped user listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserSort {
    CreateAt,
    #[default]
    LastActivityAt,
}

/// Largest `per_page` the server honours; larger values are silently
/// reduced to this.
pub const PER_PAGE_MAXIMUM: u32 = 200;

/// Query for one page of `GET /api/v4/users`.
///
/// The server pages by offset: page `n` with `per_page = k` starts at
/// record `n * k`.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct UserListParams {
    #[builder(default)]
    pub page: u64,
    pub per_page: u32,
    #[builder(into)]
    pub in_team: Option<String>,
    pub sort: Option<UserSort>,
}

impl UserListParams {
    /// Query string pairs; `in_team` and `sort` are included only when set.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("per_page".to_string(), self.per_page.to_string()),
        ];
        if let Some(ref team_id) = self.in_team {
            query.push(("in_team".to_string(), team_id.clone()));
        }
        if let Some(sort) = self.sort {
            query.push(("sort".to_string(), sort.to_string()));
        }
        query
    }
}
