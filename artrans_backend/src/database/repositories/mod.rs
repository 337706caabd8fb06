mod comments;
mod pages;
mod sites;
mod users;

use super::models::{CommentRecord, NewComment, PageRecord, SiteRecord, UserRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait SiteRepository {
    fn create(&self, name: &str, urls: &str) -> Result<SiteRecord>;
    fn get_by_name(&self, name: &str) -> Result<Option<SiteRecord>>;
    fn list(&self) -> Result<Vec<SiteRecord>>;
}

pub trait PageRepository {
    fn create(&self, key: &str, title: &str, site_name: &str) -> Result<PageRecord>;
    fn find(&self, key: &str, site_name: &str) -> Result<Option<PageRecord>>;
    fn set_admin_only(&self, id: i64, admin_only: bool) -> Result<()>;
    fn list_for_site(&self, site_name: &str) -> Result<Vec<PageRecord>>;
}

pub trait UserRepository {
    fn create(&self, name: &str, email: &str, link: &str) -> Result<UserRecord>;
    /// Case-insensitive lookup on the (name, email) natural key.
    fn find(&self, name: &str, email: &str) -> Result<Option<UserRecord>>;
    fn update_profile(&self, record: &UserRecord) -> Result<()>;
    fn list(&self) -> Result<Vec<UserRecord>>;
}

pub trait CommentRepository {
    fn create(&self, record: &NewComment) -> Result<i64>;
    fn get(&self, id: i64) -> Result<Option<CommentRecord>>;
    fn list(&self) -> Result<Vec<CommentRecord>>;
    fn set_timestamps(&self, id: i64, created_at: &str, updated_at: &str) -> Result<()>;
    /// Applies `(comment_id, rid)` pairs in a single transaction.
    fn set_rids(&self, updates: &[(i64, i64)]) -> Result<usize>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn sites(&self) -> impl SiteRepository + '_ {
        sites::SqliteSiteRepository { conn: self.conn }
    }

    pub fn pages(&self) -> impl PageRepository + '_ {
        pages::SqlitePageRepository { conn: self.conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }
}
