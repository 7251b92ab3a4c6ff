//! Sequential paging over `GET /api/v4/users`.
//!
//! The server pages by offset (`page * per_page`), so every request is
//! planned from the number of records already collected. Full pages are
//! requested until fewer than a page remains; the last request is shrunk to
//! the remaining count where the offset allows it.

use async_trait::async_trait;
use mattermost_ox::{Mattermost, MattermostRequestError, User, UserListParams, UserSort};
use tracing::{debug, info};

/// Where pages of users come from. Implemented by the API client; tests use
/// in-memory stubs.
#[async_trait]
pub trait UserSource {
    /// Number of users addressable with the given scope.
    async fn total_users(&self, team_id: Option<&str>) -> Result<u64, MattermostRequestError>;

    async fn fetch_page(&self, params: &UserListParams) -> Result<Vec<User>, MattermostRequestError>;
}

#[async_trait]
impl UserSource for Mattermost {
    async fn total_users(&self, team_id: Option<&str>) -> Result<u64, MattermostRequestError> {
        match team_id {
            Some(team_id) => Ok(self.get_team_stats(team_id).await?.total_member_count),
            None => Ok(self.get_stats().await?.total_users_count),
        }
    }

    async fn fetch_page(&self, params: &UserListParams) -> Result<Vec<User>, MattermostRequestError> {
        self.get_users(params).await
    }
}

/// Team filter and sort order applied to every page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScope {
    pub team_id: Option<String>,
    pub sort: UserSort,
}

impl PageScope {
    /// Scope with no team filter; the sort order is not sent in that case.
    #[must_use]
    pub fn unscoped() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn team(team_id: impl Into<String>, sort: UserSort) -> Self {
        Self {
            team_id: Some(team_id.into()),
            sort,
        }
    }

    fn params(&self, request: PageRequest) -> UserListParams {
        UserListParams::builder()
            .page(request.page)
            .per_page(request.per_page)
            .maybe_in_team(self.team_id.clone())
            .maybe_sort(self.team_id.as_ref().map(|_| self.sort))
            .build()
    }
}

/// One planned page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u32,
    /// Records to keep from the response; less than `per_page` only when
    /// the trailing page could not be shrunk exactly.
    pub take: u32,
}

/// Plan the request that continues at `offset` towards `target`, or `None`
/// once `target` is reached.
#[must_use]
pub fn plan_page(offset: u64, target: u64, page_size: u32) -> Option<PageRequest> {
    if page_size == 0 || offset >= target {
        return None;
    }

    let remaining = target - offset;
    let full = u64::from(page_size);
    if remaining >= full {
        return Some(PageRequest {
            page: offset / full,
            per_page: page_size,
            take: page_size,
        });
    }

    // remaining < page_size, so it fits in u32
    let remaining = u32::try_from(remaining).unwrap_or(page_size);
    // page_size always divides offset here, so the search terminates
    let per_page = (remaining..=page_size)
        .find(|size| offset % u64::from(*size) == 0)
        .unwrap_or(page_size);

    Some(PageRequest {
        page: offset / u64::from(per_page),
        per_page,
        take: remaining,
    })
}

/// Number of users to export: the cap when given, bounded by the total.
#[must_use]
pub fn target_count(total: u64, cap: Option<u64>) -> u64 {
    cap.map_or(total, |cap| cap.min(total))
}

/// Fetch pages until `target` records are collected or the server returns a
/// short page. Records keep the order the server returned them in.
pub async fn fetch_users<S>(
    source: &S,
    scope: &PageScope,
    target: u64,
    page_size: u32,
) -> Result<Vec<User>, MattermostRequestError>
where
    S: UserSource + ?Sized,
{
    let mut users: Vec<User> = Vec::new();
    let mut offset: u64 = 0;

    while let Some(request) = plan_page(offset, target, page_size) {
        debug!(
            page = request.page,
            per_page = request.per_page,
            offset,
            "fetching page"
        );
        let mut page = source.fetch_page(&scope.params(request)).await?;
        let returned = page.len();
        page.truncate(request.take as usize);
        offset += page.len() as u64;
        users.append(&mut page);

        if returned < request.per_page as usize {
            debug!(returned, requested = request.per_page, "short page, no more users");
            break;
        }
    }

    Ok(users)
}

/// Size the export from the server's statistics, then page through it.
pub async fn collect_users<S>(
    source: &S,
    scope: &PageScope,
    cap: Option<u64>,
    page_size: u32,
) -> Result<Vec<User>, MattermostRequestError>
where
    S: UserSource + ?Sized,
{
    let total = source.total_users(scope.team_id.as_deref()).await?;
    let target = target_count(total, cap);
    let first_page = u64::from(page_size).min(target);
    info!(
        total,
        target,
        page_size,
        first_page,
        pages = target.div_ceil(u64::from(page_size.max(1))),
        "extracting user information"
    );

    let users = fetch_users(source, scope, target, page_size).await?;
    if (users.len() as u64) < target {
        info!(
            retrieved = users.len(),
            target, "server returned fewer users than reported"
        );
    }
    Ok(users)
}
