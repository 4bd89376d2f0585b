//! Emergency contact database operations

use rusqlite::{Connection, Result as SqliteResult};
use serde::Deserialize;

use super::super::Database;
use crate::models::EmergencyContact;

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    pub relationship: String,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
    pub is_primary: Option<bool>,
}

impl Database {
    pub fn create_contact(
        &self,
        user_id: i64,
        req: &CreateContactRequest,
    ) -> SqliteResult<EmergencyContact> {
        let conn = self.conn();
        let is_primary = req.is_primary.unwrap_or(false);

        // Only one primary contact per user
        if is_primary {
            conn.execute(
                "UPDATE emergency_contacts SET is_primary = 0 WHERE user_id = ?1",
                [user_id],
            )?;
        }

        conn.execute(
            "INSERT INTO emergency_contacts (user_id, name, phone, relationship, is_primary)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![user_id, req.name, req.phone, req.relationship, is_primary as i32],
        )?;

        let id = conn.last_insert_rowid();
        self.get_contact_internal(&conn, user_id, id)
    }

    fn get_contact_internal(
        &self,
        conn: &Connection,
        user_id: i64,
        id: i64,
    ) -> SqliteResult<EmergencyContact> {
        conn.query_row(
            "SELECT id, user_id, name, phone, relationship, is_primary, created_at, updated_at
             FROM emergency_contacts WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
            map_contact_row,
        )
    }

    pub fn get_contact(&self, user_id: i64, id: i64) -> SqliteResult<Option<EmergencyContact>> {
        let conn = self.conn();
        match self.get_contact_internal(&conn, user_id, id) {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_contacts(&self, user_id: i64) -> SqliteResult<Vec<EmergencyContact>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, phone, relationship, is_primary, created_at, updated_at
             FROM emergency_contacts WHERE user_id = ?1
             ORDER BY is_primary DESC, created_at DESC",
        )?;

        let contacts: Vec<EmergencyContact> = stmt
            .query_map([user_id], map_contact_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(contacts)
    }

    /// Partial update; promoting to primary demotes every other contact.
    pub fn update_contact(
        &self,
        user_id: i64,
        id: i64,
        req: &UpdateContactRequest,
    ) -> SqliteResult<Option<EmergencyContact>> {
        let conn = self.conn();
        let existing = match self.get_contact_internal(&conn, user_id, id) {
            Ok(contact) => contact,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e),
        };

        let name = req.name.as_deref().unwrap_or(&existing.name);
        let phone = req.phone.as_deref().unwrap_or(&existing.phone);
        let relationship = req.relationship.as_deref().unwrap_or(&existing.relationship);
        let is_primary = req.is_primary.unwrap_or(existing.is_primary);

        if is_primary && !existing.is_primary {
            conn.execute(
                "UPDATE emergency_contacts SET is_primary = 0 WHERE user_id = ?1 AND id != ?2",
                [user_id, id],
            )?;
        }

        conn.execute(
            "UPDATE emergency_contacts
             SET name = ?1, phone = ?2, relationship = ?3, is_primary = ?4,
                 updated_at = datetime('now')
             WHERE id = ?5 AND user_id = ?6",
            rusqlite::params![name, phone, relationship, is_primary as i32, id, user_id],
        )?;

        self.get_contact_internal(&conn, user_id, id).map(Some)
    }

    pub fn delete_contact(&self, user_id: i64, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM emergency_contacts WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Make `id` the sole primary contact. Returns false if the row is missing.
    pub fn set_primary_contact(&self, user_id: i64, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        match self.get_contact_internal(&conn, user_id, id) {
            Ok(_) => {}
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(false),
            Err(e) => return Err(e),
        }

        conn.execute(
            "UPDATE emergency_contacts SET is_primary = 0 WHERE user_id = ?1",
            [user_id],
        )?;
        conn.execute(
            "UPDATE emergency_contacts SET is_primary = 1, updated_at = datetime('now')
             WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;

        Ok(true)
    }

    pub fn get_primary_contact(&self, user_id: i64) -> SqliteResult<Option<EmergencyContact>> {
        let conn = self.conn();
        match conn.query_row(
            "SELECT id, user_id, name, phone, relationship, is_primary, created_at, updated_at
             FROM emergency_contacts WHERE user_id = ?1 AND is_primary = 1",
            [user_id],
            map_contact_row,
        ) {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn map_contact_row(row: &rusqlite::Row) -> SqliteResult<EmergencyContact> {
    Ok(EmergencyContact {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        relationship: row.get(4)?,
        is_primary: row.get::<_, i32>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
