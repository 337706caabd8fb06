use crate::database::models::{CommentRecord, NewComment};
use crate::utils::now_utc_iso;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteCommentRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const COMMENT_COLUMNS: &str = "id, content, page_key, site_name, user_id, rid, ua, ip, \
     is_collapsed, is_pending, is_pinned, vote_up, vote_down, created_at, updated_at";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        page_key: row.get(2)?,
        site_name: row.get(3)?,
        user_id: row.get(4)?,
        rid: row.get(5)?,
        ua: row.get(6)?,
        ip: row.get(7)?,
        is_collapsed: row.get(8)?,
        is_pending: row.get(9)?,
        is_pinned: row.get(10)?,
        vote_up: row.get(11)?,
        vote_down: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

impl<'conn> super::CommentRepository for SqliteCommentRepository<'conn> {
    fn create(&self, record: &NewComment) -> Result<i64> {
        let now = now_utc_iso();
        self.conn.execute(
            r#"
            INSERT INTO comments (
                content, page_key, site_name, user_id, rid, ua, ip,
                is_collapsed, is_pending, is_pinned, vote_up, vote_down,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            "#,
            params![
                record.content,
                record.page_key,
                record.site_name,
                record.user_id,
                record.rid,
                record.ua,
                record.ip,
                record.is_collapsed,
                record.is_pending,
                record.is_pinned,
                record.vote_up,
                record.vote_down,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, id: i64) -> Result<Option<CommentRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
                params![id],
                map_comment,
            )
            .optional()?)
    }

    fn list(&self) -> Result<Vec<CommentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id ASC"))?;
        let rows = stmt.query_map([], map_comment)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    fn set_timestamps(&self, id: i64, created_at: &str, updated_at: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE comments SET created_at = ?1, updated_at = ?2 WHERE id = ?3",
            params![created_at, updated_at, id],
        )?;
        Ok(())
    }

    fn set_rids(&self, updates: &[(i64, i64)]) -> Result<usize> {
        if updates.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.unchecked_transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare("UPDATE comments SET rid = ?1 WHERE id = ?2")?;
            for (comment_id, rid) in updates {
                changed += stmt.execute(params![rid, comment_id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }
}
