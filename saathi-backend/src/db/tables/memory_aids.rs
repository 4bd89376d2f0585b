//! Memory aid database operations

use reminder_types::MemoryAid;
use rusqlite::{Connection, Result as SqliteResult};
use serde::Deserialize;

use super::super::Database;

#[derive(Debug, Deserialize)]
pub struct CreateMemoryAidRequest {
    pub title: String,
    pub date: String,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemoryAidRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl Database {
    pub fn create_memory_aid(
        &self,
        user_id: i64,
        req: &CreateMemoryAidRequest,
    ) -> SqliteResult<MemoryAid> {
        let conn = self.conn();

        conn.execute(
            "INSERT INTO memory_aids (user_id, title, date, time, type, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![user_id, req.title, req.date, req.time, req.kind, req.notes],
        )?;

        let id = conn.last_insert_rowid();
        self.get_memory_aid_internal(&conn, user_id, id)
    }

    fn get_memory_aid_internal(
        &self,
        conn: &Connection,
        user_id: i64,
        id: i64,
    ) -> SqliteResult<MemoryAid> {
        conn.query_row(
            "SELECT id, user_id, title, date, time, type, notes, is_active, created_at, updated_at
             FROM memory_aids WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
            map_memory_aid_row,
        )
    }

    pub fn get_memory_aid(&self, user_id: i64, id: i64) -> SqliteResult<Option<MemoryAid>> {
        let conn = self.conn();
        match self.get_memory_aid_internal(&conn, user_id, id) {
            Ok(aid) => Ok(Some(aid)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_memory_aids(&self, user_id: i64) -> SqliteResult<Vec<MemoryAid>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, date, time, type, notes, is_active, created_at, updated_at
             FROM memory_aids WHERE user_id = ?1 ORDER BY date ASC, created_at DESC",
        )?;

        let aids: Vec<MemoryAid> = stmt
            .query_map([user_id], map_memory_aid_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(aids)
    }

    /// Active aids whose date is exactly `date` ("YYYY-MM-DD").
    pub fn list_memory_aids_for_date(&self, user_id: i64, date: &str) -> SqliteResult<Vec<MemoryAid>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, date, time, type, notes, is_active, created_at, updated_at
             FROM memory_aids WHERE user_id = ?1 AND date = ?2 AND is_active = 1
             ORDER BY created_at DESC",
        )?;

        let aids: Vec<MemoryAid> = stmt
            .query_map(rusqlite::params![user_id, date], map_memory_aid_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(aids)
    }

    /// Active aids with `from <= date <= to`, soonest first.
    pub fn list_memory_aids_between(
        &self,
        user_id: i64,
        from: &str,
        to: &str,
    ) -> SqliteResult<Vec<MemoryAid>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, date, time, type, notes, is_active, created_at, updated_at
             FROM memory_aids
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND is_active = 1
             ORDER BY date ASC, created_at DESC",
        )?;

        let aids: Vec<MemoryAid> = stmt
            .query_map(rusqlite::params![user_id, from, to], map_memory_aid_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(aids)
    }

    /// Partial update; absent fields keep their current values.
    pub fn update_memory_aid(
        &self,
        user_id: i64,
        id: i64,
        req: &UpdateMemoryAidRequest,
    ) -> SqliteResult<Option<MemoryAid>> {
        let conn = self.conn();
        let existing = match self.get_memory_aid_internal(&conn, user_id, id) {
            Ok(aid) => aid,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        let title = req.title.as_deref().unwrap_or(&existing.title);
        let date = req.date.as_deref().unwrap_or(&existing.date);
        let time = req.time.as_deref().or(existing.time.as_deref());
        let kind = req.kind.as_deref().unwrap_or(&existing.kind);
        let notes = req.notes.as_deref().or(existing.notes.as_deref());
        let is_active = req.is_active.unwrap_or(existing.is_active);

        conn.execute(
            "UPDATE memory_aids
             SET title = ?1, date = ?2, time = ?3, type = ?4, notes = ?5, is_active = ?6,
                 updated_at = datetime('now')
             WHERE id = ?7 AND user_id = ?8",
            rusqlite::params![title, date, time, kind, notes, is_active as i32, id, user_id],
        )?;

        self.get_memory_aid_internal(&conn, user_id, id).map(Some)
    }

    pub fn delete_memory_aid(&self, user_id: i64, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM memory_aids WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_memory_aid_row(row: &rusqlite::Row) -> SqliteResult<MemoryAid> {
    Ok(MemoryAid {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        date: row.get(3)?,
        time: row.get(4)?,
        kind: row.get(5)?,
        notes: row.get(6)?,
        is_active: row.get::<_, i32>(7)? != 0,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user() -> (Database, i64) {
        let db = Database::new(":memory:").unwrap();
        let user = db.create_user("asha@example.com", "pw", None, None).unwrap();
        (db, user.id)
    }

    fn sample(title: &str, date: &str, time: Option<&str>) -> CreateMemoryAidRequest {
        CreateMemoryAidRequest {
            title: title.to_string(),
            date: date.to_string(),
            time: time.map(|t| t.to_string()),
            kind: "birthday".to_string(),
            notes: None,
        }
    }

    #[test]
    fn date_filters_only_cover_active_aids() {
        let (db, user_id) = db_with_user();
        let today = db
            .create_memory_aid(user_id, &sample("Ravi's birthday", "2025-06-10", Some("09:00")))
            .unwrap();
        db.create_memory_aid(user_id, &sample("Anniversary", "2025-06-12", None))
            .unwrap();

        let on_day = db.list_memory_aids_for_date(user_id, "2025-06-10").unwrap();
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].title, "Ravi's birthday");

        let in_week = db
            .list_memory_aids_between(user_id, "2025-06-10", "2025-06-17")
            .unwrap();
        assert_eq!(in_week.len(), 2);

        // Deactivated aids drop out of both views
        db.update_memory_aid(
            user_id,
            today.id,
            &UpdateMemoryAidRequest {
                title: None,
                date: None,
                time: None,
                kind: None,
                notes: None,
                is_active: Some(false),
            },
        )
        .unwrap();
        assert!(db.list_memory_aids_for_date(user_id, "2025-06-10").unwrap().is_empty());
    }

    #[test]
    fn update_preserves_absent_fields() {
        let (db, user_id) = db_with_user();
        let aid = db
            .create_memory_aid(user_id, &sample("Pooja", "2025-06-10", Some("18:30")))
            .unwrap();

        let updated = db
            .update_memory_aid(
                user_id,
                aid.id,
                &UpdateMemoryAidRequest {
                    title: Some("Evening pooja".to_string()),
                    date: None,
                    time: None,
                    kind: None,
                    notes: Some("Light the lamp".to_string()),
                    is_active: None,
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Evening pooja");
        assert_eq!(updated.date, "2025-06-10");
        assert_eq!(updated.time.as_deref(), Some("18:30"));
        assert_eq!(updated.notes.as_deref(), Some("Light the lamp"));
    }

    #[test]
    fn aids_are_owner_scoped() {
        let (db, user_id) = db_with_user();
        let other = db.create_user("ravi@example.com", "pw", None, None).unwrap();
        let aid = db
            .create_memory_aid(other.id, &sample("Private", "2025-06-10", None))
            .unwrap();

        assert!(db.get_memory_aid(user_id, aid.id).unwrap().is_none());
        assert!(!db.delete_memory_aid(user_id, aid.id).unwrap());
    }
}
