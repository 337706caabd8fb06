use crate::database::models::UserRecord;
use crate::utils::now_utc_iso;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteUserRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const USER_COLUMNS: &str =
    "id, name, email, link, password, badge_name, badge_color, created_at, updated_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        link: row.get(3)?,
        password: row.get(4)?,
        badge_name: row.get(5)?,
        badge_color: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl<'conn> super::UserRepository for SqliteUserRepository<'conn> {
    fn create(&self, name: &str, email: &str, link: &str) -> Result<UserRecord> {
        let now = now_utc_iso();
        self.conn.execute(
            r#"
            INSERT INTO users (name, email, link, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![name, email, link, now],
        )?;
        Ok(UserRecord {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            link: link.to_string(),
            password: String::new(),
            badge_name: String::new(),
            badge_color: String::new(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    fn find(&self, name: &str, email: &str) -> Result<Option<UserRecord>> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     WHERE LOWER(name) = LOWER(?1) AND LOWER(email) = LOWER(?2) \
                     ORDER BY id ASC LIMIT 1"
                ),
                params![name, email],
                map_user,
            )
            .optional()?)
    }

    fn update_profile(&self, record: &UserRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE users
            SET link = ?1, password = ?2, badge_name = ?3, badge_color = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                record.link,
                record.password,
                record.badge_name,
                record.badge_color,
                now_utc_iso(),
                record.id
            ],
        )?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
        let rows = stmt.query_map([], map_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}
