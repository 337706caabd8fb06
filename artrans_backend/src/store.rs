//! Storage operations the import pipeline depends on.

use crate::database::models::{NewComment, PageRecord, SiteRecord, UserRecord};
use crate::database::repositories::{
    CommentRepository, PageRepository, SiteRepository, UserRepository,
};
use crate::database::Database;
use anyhow::{Context, Result};

/// Author fields carried by a source record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub link: String,
    pub password: String,
    pub badge_name: String,
    pub badge_color: String,
}

pub trait ImportStore {
    /// Returns the site named `name`, creating it with `urls` when absent.
    fn find_or_create_site(&self, name: &str, urls: &str) -> Result<SiteRecord>;
    /// Finds the user by (name, email) or creates it, then applies any
    /// non-empty password/badge values from `profile`.
    fn find_or_create_user(&self, profile: &UserProfile) -> Result<UserRecord>;
    /// Finds the page by (key, site) or creates it, then sets its admin-only flag.
    fn find_or_create_page(
        &self,
        key: &str,
        title: &str,
        site_name: &str,
        admin_only: bool,
    ) -> Result<PageRecord>;
    fn create_comment(&self, comment: &NewComment) -> Result<i64>;
    fn restore_timestamps(&self, comment_id: i64, created_at: &str, updated_at: &str)
        -> Result<()>;
    /// Bulk parent rewrite, `(comment_id, rid)` pairs.
    fn rewrite_parents(&self, updates: &[(i64, i64)]) -> Result<usize>;
}

impl ImportStore for Database {
    fn find_or_create_site(&self, name: &str, urls: &str) -> Result<SiteRecord> {
        self.with_repositories(|repos| {
            let sites = repos.sites();
            if let Some(existing) = sites.get_by_name(name)? {
                return Ok(existing);
            }
            tracing::info!(site = %name, "creating site");
            sites
                .create(name, urls)
                .with_context(|| format!("failed to create site {name:?}"))
        })
    }

    fn find_or_create_user(&self, profile: &UserProfile) -> Result<UserRecord> {
        self.with_repositories(|repos| {
            let users = repos.users();
            let mut user = match users.find(&profile.name, &profile.email)? {
                Some(user) => user,
                None => users
                    .create(&profile.name, &profile.email, &profile.link)
                    .with_context(|| format!("failed to create user {:?}", profile.name))?,
            };

            let mut changed = false;
            for (target, value) in [
                (&mut user.password, &profile.password),
                (&mut user.badge_name, &profile.badge_name),
                (&mut user.badge_color, &profile.badge_color),
            ] {
                if !value.is_empty() && *target != *value {
                    *target = value.clone();
                    changed = true;
                }
            }
            if changed {
                users.update_profile(&user)?;
            }
            Ok(user)
        })
    }

    fn find_or_create_page(
        &self,
        key: &str,
        title: &str,
        site_name: &str,
        admin_only: bool,
    ) -> Result<PageRecord> {
        self.with_repositories(|repos| {
            let pages = repos.pages();
            let mut page = match pages.find(key, site_name)? {
                Some(page) => page,
                None => pages
                    .create(key, title, site_name)
                    .with_context(|| format!("failed to create page {key:?}"))?,
            };
            if page.admin_only != admin_only {
                pages.set_admin_only(page.id, admin_only)?;
                page.admin_only = admin_only;
            }
            Ok(page)
        })
    }

    fn create_comment(&self, comment: &NewComment) -> Result<i64> {
        self.with_repositories(|repos| repos.comments().create(comment))
    }

    fn restore_timestamps(
        &self,
        comment_id: i64,
        created_at: &str,
        updated_at: &str,
    ) -> Result<()> {
        self.with_repositories(|repos| {
            repos
                .comments()
                .set_timestamps(comment_id, created_at, updated_at)
        })
    }

    fn rewrite_parents(&self, updates: &[(i64, i64)]) -> Result<usize> {
        self.with_repositories(|repos| repos.comments().set_rids(updates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, email: &str) -> UserProfile {
        UserProfile {
            name: name.into(),
            email: email.into(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn find_or_create_is_idempotent_on_natural_keys() {
        let db = Database::open_in_memory().unwrap();
        let first = db.find_or_create_user(&profile("amy", "amy@example.com")).unwrap();
        let second = db.find_or_create_user(&profile("AMY", "amy@example.com")).unwrap();
        assert_eq!(first.id, second.id);

        let site_a = db.find_or_create_site("Blog", "https://blog.example").unwrap();
        let site_b = db.find_or_create_site("Blog", "https://ignored.example").unwrap();
        assert_eq!(site_a.id, site_b.id);
        assert_eq!(site_b.urls, "https://blog.example");

        let page_a = db.find_or_create_page("/p", "P", "Blog", false).unwrap();
        let page_b = db.find_or_create_page("/p", "Other title", "Blog", true).unwrap();
        assert_eq!(page_a.id, page_b.id);
        assert!(page_b.admin_only);
        assert_eq!(page_b.title, "P");
    }

    #[test]
    fn profile_overrides_only_apply_when_present() {
        let db = Database::open_in_memory().unwrap();
        let mut with_badge = profile("amy", "amy@example.com");
        with_badge.badge_name = "Owner".into();
        with_badge.badge_color = "#f00".into();
        db.find_or_create_user(&with_badge).unwrap();

        let plain = db.find_or_create_user(&profile("amy", "amy@example.com")).unwrap();
        assert_eq!(plain.badge_name, "Owner");
        assert_eq!(plain.badge_color, "#f00");
    }
}
