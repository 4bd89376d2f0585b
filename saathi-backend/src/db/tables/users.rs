//! User account database operations

use rusqlite::{Connection, Result as SqliteResult};
use sha2::{Digest, Sha256};

use super::super::Database;
use crate::models::User;

/// Salted SHA-256 of a password, hex encoded.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(user: &User, password: &str) -> bool {
    hash_password(password, &user.salt) == user.password_hash
}

fn generate_salt() -> String {
    use rand::Rng;
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);
    hex::encode(salt)
}

impl Database {
    pub fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> SqliteResult<User> {
        let conn = self.conn();
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);

        conn.execute(
            "INSERT INTO users (email, password_hash, salt, name, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![email, password_hash, salt, name, phone],
        )?;

        let id = conn.last_insert_rowid();
        self.get_user_by_id_internal(&conn, id)
    }

    fn get_user_by_id_internal(&self, conn: &Connection, id: i64) -> SqliteResult<User> {
        conn.query_row(
            "SELECT id, email, password_hash, salt, name, phone, created_at, updated_at
             FROM users WHERE id = ?1",
            [id],
            map_user_row,
        )
    }

    pub fn get_user_by_id(&self, id: i64) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        match self.get_user_by_id_internal(&conn, id) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        match conn.query_row(
            "SELECT id, email, password_hash, salt, name, phone, created_at, updated_at
             FROM users WHERE email = ?1",
            [email],
            map_user_row,
        ) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn update_user_profile(
        &self,
        id: i64,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> SqliteResult<Option<User>> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE users SET name = ?1, phone = ?2, updated_at = datetime('now') WHERE id = ?3",
            rusqlite::params![name, phone, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_user_by_id_internal(&conn, id).map(Some)
    }
}

fn map_user_row(row: &rusqlite::Row) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        salt: row.get(3)?,
        name: row.get(4)?,
        phone: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_password() {
        let db = Database::new(":memory:").unwrap();
        let user = db
            .create_user("asha@example.com", "secret123", Some("Asha"), None)
            .unwrap();

        assert!(verify_password(&user, "secret123"));
        assert!(!verify_password(&user, "wrong"));

        // Same password, different user, different salt => different hash
        let other = db
            .create_user("ravi@example.com", "secret123", None, None)
            .unwrap();
        assert_ne!(user.password_hash, other.password_hash);
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::new(":memory:").unwrap();
        db.create_user("asha@example.com", "pw", None, None).unwrap();
        let err = db.create_user("asha@example.com", "pw2", None, None);
        assert!(err.is_err());
    }

    #[test]
    fn profile_update_overwrites_name_and_phone() {
        let db = Database::new(":memory:").unwrap();
        let user = db
            .create_user("asha@example.com", "pw", Some("Asha"), Some("111"))
            .unwrap();

        let updated = db
            .update_user_profile(user.id, Some("Asha D"), None)
            .unwrap()
            .unwrap();
        assert_eq!(updated.name.as_deref(), Some("Asha D"));
        assert_eq!(updated.phone, None);

        assert!(db.update_user_profile(9999, None, None).unwrap().is_none());
    }
}
