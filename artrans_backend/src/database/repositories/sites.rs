use crate::database::models::SiteRecord;
use crate::utils::now_utc_iso;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteSiteRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_site(row: &Row<'_>) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        urls: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl<'conn> super::SiteRepository for SqliteSiteRepository<'conn> {
    fn create(&self, name: &str, urls: &str) -> Result<SiteRecord> {
        let now = now_utc_iso();
        self.conn.execute(
            r#"
            INSERT INTO sites (name, urls, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
            params![name, urls, now],
        )?;
        Ok(SiteRecord {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            urls: urls.to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn get_by_name(&self, name: &str) -> Result<Option<SiteRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, urls, created_at, updated_at
                FROM sites
                WHERE name = ?1
                "#,
                params![name],
                map_site,
            )
            .optional()?)
    }

    fn list(&self) -> Result<Vec<SiteRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, urls, created_at, updated_at FROM sites ORDER BY id ASC")?;
        let rows = stmt.query_map([], map_site)?;
        let mut sites = Vec::new();
        for row in rows {
            sites.push(row?);
        }
        Ok(sites)
    }
}
