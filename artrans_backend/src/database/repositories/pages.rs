use crate::database::models::PageRecord;
use crate::utils::now_utc_iso;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqlitePageRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_page(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        key: row.get(1)?,
        title: row.get(2)?,
        site_name: row.get(3)?,
        admin_only: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl<'conn> super::PageRepository for SqlitePageRepository<'conn> {
    fn create(&self, key: &str, title: &str, site_name: &str) -> Result<PageRecord> {
        let now = now_utc_iso();
        self.conn.execute(
            r#"
            INSERT INTO pages (key, title, site_name, admin_only, created_at, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4, ?4)
            "#,
            params![key, title, site_name, now],
        )?;
        Ok(PageRecord {
            id: self.conn.last_insert_rowid(),
            key: key.to_string(),
            title: title.to_string(),
            site_name: site_name.to_string(),
            admin_only: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn find(&self, key: &str, site_name: &str) -> Result<Option<PageRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, key, title, site_name, admin_only, created_at, updated_at
                FROM pages
                WHERE key = ?1 AND site_name = ?2
                "#,
                params![key, site_name],
                map_page,
            )
            .optional()?)
    }

    fn set_admin_only(&self, id: i64, admin_only: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE pages SET admin_only = ?1, updated_at = ?2 WHERE id = ?3",
            params![admin_only, now_utc_iso(), id],
        )?;
        Ok(())
    }

    fn list_for_site(&self, site_name: &str) -> Result<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, key, title, site_name, admin_only, created_at, updated_at
            FROM pages
            WHERE site_name = ?1
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![site_name], map_page)?;
        let mut pages = Vec::new();
        for row in rows {
            pages.push(row?);
        }
        Ok(pages)
    }
}
