use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRecord {
    pub id: i64,
    pub name: String,
    /// Comma-separated list of the site's public URLs.
    pub urls: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub site_name: String,
    pub admin_only: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub link: String,
    pub password: String,
    pub badge_name: String,
    pub badge_color: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: i64,
    pub content: String,
    pub page_key: String,
    pub site_name: String,
    pub user_id: i64,
    /// Parent comment id, `0` for top-level comments.
    pub rid: i64,
    pub ua: String,
    pub ip: String,
    pub is_collapsed: bool,
    pub is_pending: bool,
    pub is_pinned: bool,
    pub vote_up: i64,
    pub vote_down: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a comment; the store assigns `id` and both timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewComment {
    pub content: String,
    pub page_key: String,
    pub site_name: String,
    pub user_id: i64,
    pub rid: i64,
    pub ua: String,
    pub ip: String,
    pub is_collapsed: bool,
    pub is_pending: bool,
    pub is_pinned: bool,
    pub vote_up: i64,
    pub vote_down: i64,
}
