//! Medicine reminder database operations

use reminder_types::{MedicineReminder, Weekday};
use rusqlite::{Connection, Result as SqliteResult};
use serde::Deserialize;

use super::super::Database;

#[derive(Debug, Deserialize)]
pub struct CreateMedicineRequest {
    pub name: String,
    pub time: String,
    pub days: Vec<Weekday>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMedicineRequest {
    pub name: Option<String>,
    pub time: Option<String>,
    pub days: Option<Vec<Weekday>>,
    pub is_active: Option<bool>,
}

impl Database {
    pub fn create_medicine(
        &self,
        user_id: i64,
        req: &CreateMedicineRequest,
    ) -> SqliteResult<MedicineReminder> {
        let conn = self.conn();
        let days = serde_json::to_string(&req.days).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "INSERT INTO medicine_reminders (user_id, name, time, days) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![user_id, req.name, req.time, days],
        )?;

        let id = conn.last_insert_rowid();
        self.get_medicine_internal(&conn, user_id, id)
    }

    fn get_medicine_internal(
        &self,
        conn: &Connection,
        user_id: i64,
        id: i64,
    ) -> SqliteResult<MedicineReminder> {
        conn.query_row(
            "SELECT id, user_id, name, time, days, is_active, created_at, updated_at
             FROM medicine_reminders WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
            map_medicine_row,
        )
    }

    pub fn get_medicine(&self, user_id: i64, id: i64) -> SqliteResult<Option<MedicineReminder>> {
        let conn = self.conn();
        match self.get_medicine_internal(&conn, user_id, id) {
            Ok(medicine) => Ok(Some(medicine)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_medicines(&self, user_id: i64) -> SqliteResult<Vec<MedicineReminder>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, time, days, is_active, created_at, updated_at
             FROM medicine_reminders WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let medicines: Vec<MedicineReminder> = stmt
            .query_map([user_id], map_medicine_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(medicines)
    }

    /// Partial update; absent fields keep their current values.
    pub fn update_medicine(
        &self,
        user_id: i64,
        id: i64,
        req: &UpdateMedicineRequest,
    ) -> SqliteResult<Option<MedicineReminder>> {
        let conn = self.conn();
        let existing = match self.get_medicine_internal(&conn, user_id, id) {
            Ok(m) => m,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        let name = req.name.as_deref().unwrap_or(&existing.name);
        let time = req.time.as_deref().unwrap_or(&existing.time);
        let days = req.days.as_ref().unwrap_or(&existing.days);
        let days = serde_json::to_string(days).unwrap_or_else(|_| "[]".to_string());
        let is_active = req.is_active.unwrap_or(existing.is_active);

        conn.execute(
            "UPDATE medicine_reminders
             SET name = ?1, time = ?2, days = ?3, is_active = ?4, updated_at = datetime('now')
             WHERE id = ?5 AND user_id = ?6",
            rusqlite::params![name, time, days, is_active as i32, id, user_id],
        )?;

        self.get_medicine_internal(&conn, user_id, id).map(Some)
    }

    pub fn delete_medicine(&self, user_id: i64, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM medicine_reminders WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flip is_active; returns the new value, or None if the row is missing.
    pub fn toggle_medicine(&self, user_id: i64, id: i64) -> SqliteResult<Option<bool>> {
        let conn = self.conn();
        let current: i32 = match conn.query_row(
            "SELECT is_active FROM medicine_reminders WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
            |row| row.get(0),
        ) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        let new_status = current == 0;
        conn.execute(
            "UPDATE medicine_reminders SET is_active = ?1, updated_at = datetime('now')
             WHERE id = ?2 AND user_id = ?3",
            rusqlite::params![new_status as i32, id, user_id],
        )?;

        Ok(Some(new_status))
    }
}

fn map_medicine_row(row: &rusqlite::Row) -> SqliteResult<MedicineReminder> {
    let days_json: String = row.get(4)?;
    Ok(MedicineReminder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        time: row.get(3)?,
        days: serde_json::from_str(&days_json).unwrap_or_default(),
        is_active: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
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

    fn sample(name: &str, time: &str, days: Vec<Weekday>) -> CreateMedicineRequest {
        CreateMedicineRequest {
            name: name.to_string(),
            time: time.to_string(),
            days,
        }
    }

    #[test]
    fn create_defaults_to_active_and_round_trips_days() {
        let (db, user_id) = db_with_user();
        let medicine = db
            .create_medicine(user_id, &sample("Metformin", "09:00", vec![Weekday::Mon, Weekday::Wed]))
            .unwrap();

        assert!(medicine.is_active);
        assert_eq!(medicine.days, vec![Weekday::Mon, Weekday::Wed]);

        let listed = db.list_medicines(user_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn lists_are_owner_scoped() {
        let (db, user_id) = db_with_user();
        let other = db.create_user("ravi@example.com", "pw", None, None).unwrap();

        db.create_medicine(user_id, &sample("Metformin", "09:00", vec![]))
            .unwrap();
        let medicine = db
            .create_medicine(other.id, &sample("Aspirin", "20:00", vec![]))
            .unwrap();

        assert_eq!(db.list_medicines(user_id).unwrap().len(), 1);
        assert_eq!(db.list_medicines(other.id).unwrap().len(), 1);

        // Cross-user access behaves like a missing row
        assert!(db.get_medicine(user_id, medicine.id).unwrap().is_none());
        assert!(!db.delete_medicine(user_id, medicine.id).unwrap());
        assert!(db.toggle_medicine(user_id, medicine.id).unwrap().is_none());
    }

    #[test]
    fn toggle_flips_active_status() {
        let (db, user_id) = db_with_user();
        let medicine = db
            .create_medicine(user_id, &sample("Metformin", "09:00", vec![]))
            .unwrap();

        assert_eq!(db.toggle_medicine(user_id, medicine.id).unwrap(), Some(false));
        assert_eq!(db.toggle_medicine(user_id, medicine.id).unwrap(), Some(true));
    }

    #[test]
    fn partial_update_keeps_absent_fields() {
        let (db, user_id) = db_with_user();
        let medicine = db
            .create_medicine(user_id, &sample("Metformin", "09:00", vec![Weekday::Mon]))
            .unwrap();

        let updated = db
            .update_medicine(
                user_id,
                medicine.id,
                &UpdateMedicineRequest {
                    name: None,
                    time: Some("10:30".to_string()),
                    days: None,
                    is_active: None,
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Metformin");
        assert_eq!(updated.time, "10:30");
        assert_eq!(updated.days, vec![Weekday::Mon]);
        assert!(updated.is_active);
    }
}
