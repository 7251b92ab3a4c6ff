use serde::{Deserialize, Serialize};

/// A team as returned by `GET /api/v4/teams/name/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    /// URL-friendly slug, unique per server.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response of `GET /api/v4/teams/{team_id}/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_id: String,
    pub total_member_count: u64,
    #[serde(default)]
    pub active_member_count: u64,
}
