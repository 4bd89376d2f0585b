//! Mood entry database operations

use rusqlite::Result as SqliteResult;
use serde::Deserialize;
use std::collections::HashMap;

use super::super::Database;
use crate::models::{MoodEntry, MoodStat};

#[derive(Debug, Deserialize)]
pub struct CreateMoodEntryRequest {
    pub mood: String,
    pub activity_type: Option<String>,
    pub activity_content: Option<String>,
    pub interests: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl Database {
    pub fn create_mood_entry(
        &self,
        user_id: i64,
        req: &CreateMoodEntryRequest,
    ) -> SqliteResult<MoodEntry> {
        let conn = self.conn();
        let interests = req
            .interests
            .as_ref()
            .map(|i| serde_json::to_string(i).unwrap_or_else(|_| "[]".to_string()));

        conn.execute(
            "INSERT INTO mood_entries (user_id, mood, activity_type, activity_content, interests, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                user_id,
                req.mood,
                req.activity_type,
                req.activity_content,
                interests,
                req.notes
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, user_id, mood, activity_type, activity_content, interests, notes, created_at
             FROM mood_entries WHERE id = ?1",
            [id],
            map_mood_entry_row,
        )
    }

    pub fn list_mood_entries(&self, user_id: i64) -> SqliteResult<Vec<MoodEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, mood, activity_type, activity_content, interests, notes, created_at
             FROM mood_entries WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;

        let entries: Vec<MoodEntry> = stmt
            .query_map([user_id], map_mood_entry_row)?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Per-mood counts over the last `period_days` days, most frequent first.
    /// Percentages are of the entries inside the window.
    pub fn mood_stats(&self, user_id: i64, period_days: i64) -> SqliteResult<Vec<MoodStat>> {
        let conn = self.conn();
        let window = format!("-{} days", period_days);

        let mut stmt = conn.prepare(
            "SELECT mood, COUNT(*) as count FROM mood_entries
             WHERE user_id = ?1 AND created_at >= datetime('now', ?2)
             GROUP BY mood ORDER BY count DESC",
        )?;

        let counts: Vec<(String, i64)> = stmt
            .query_map(rusqlite::params![user_id, window], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .filter_map(|r| r.ok())
            .collect();

        let total: i64 = counts.iter().map(|(_, c)| c).sum();
        let stats = counts
            .into_iter()
            .map(|(mood, count)| MoodStat {
                mood,
                count,
                percentage: if total > 0 {
                    (count as f64 / total as f64 * 100.0).round() as i64
                } else {
                    0
                },
            })
            .collect();

        Ok(stats)
    }

    /// Top-10 interests across all of a user's entries, by mention count.
    pub fn top_interests(&self, user_id: i64) -> SqliteResult<Vec<(String, i64)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT interests FROM mood_entries WHERE user_id = ?1 AND interests IS NOT NULL",
        )?;

        let rows: Vec<String> = stmt
            .query_map([user_id], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        let mut tally: HashMap<String, i64> = HashMap::new();
        for raw in rows {
            let interests: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
            for interest in interests {
                *tally.entry(interest).or_insert(0) += 1;
            }
        }

        let mut sorted: Vec<(String, i64)> = tally.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        sorted.truncate(10);

        Ok(sorted)
    }

    pub fn delete_mood_entry(&self, user_id: i64, id: i64) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "DELETE FROM mood_entries WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        Ok(rows_affected > 0)
    }
}

fn map_mood_entry_row(row: &rusqlite::Row) -> SqliteResult<MoodEntry> {
    let interests_json: Option<String> = row.get(5)?;
    Ok(MoodEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood: row.get(2)?,
        activity_type: row.get(3)?,
        activity_content: row.get(4)?,
        interests: interests_json
            .map(|raw| serde_json::from_str(&raw).unwrap_or_default())
            .unwrap_or_default(),
        notes: row.get(6)?,
        created_at: row.get(7)?,
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

    fn entry(mood: &str, interests: Option<Vec<&str>>) -> CreateMoodEntryRequest {
        CreateMoodEntryRequest {
            mood: mood.to_string(),
            activity_type: None,
            activity_content: None,
            interests: interests.map(|i| i.into_iter().map(String::from).collect()),
            notes: None,
        }
    }

    #[test]
    fn stats_count_and_percentage() {
        let (db, user_id) = db_with_user();
        db.create_mood_entry(user_id, &entry("happy", None)).unwrap();
        db.create_mood_entry(user_id, &entry("happy", None)).unwrap();
        db.create_mood_entry(user_id, &entry("sad", None)).unwrap();

        let stats = db.mood_stats(user_id, 7).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].mood, "happy");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 67);
        assert_eq!(stats[1].mood, "sad");
        assert_eq!(stats[1].percentage, 33);
    }

    #[test]
    fn stats_ignore_entries_outside_the_window() {
        let (db, user_id) = db_with_user();
        let old = db.create_mood_entry(user_id, &entry("sad", None)).unwrap();
        db.create_mood_entry(user_id, &entry("happy", None)).unwrap();

        db.conn()
            .execute(
                "UPDATE mood_entries SET created_at = datetime('now', '-30 days') WHERE id = ?1",
                [old.id],
            )
            .unwrap();

        let stats = db.mood_stats(user_id, 7).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].mood, "happy");
        assert_eq!(stats[0].percentage, 100);
    }

    #[test]
    fn interests_are_tallied_across_entries() {
        let (db, user_id) = db_with_user();
        db.create_mood_entry(user_id, &entry("happy", Some(vec!["music", "garden"])))
            .unwrap();
        db.create_mood_entry(user_id, &entry("normal", Some(vec!["music"])))
            .unwrap();
        db.create_mood_entry(user_id, &entry("sad", None)).unwrap();

        let interests = db.top_interests(user_id).unwrap();
        assert_eq!(interests[0], ("music".to_string(), 2));
        assert_eq!(interests[1], ("garden".to_string(), 1));
    }

    #[test]
    fn interests_round_trip_as_json_text() {
        let (db, user_id) = db_with_user();
        db.create_mood_entry(user_id, &entry("happy", Some(vec!["bhajans"])))
            .unwrap();

        let listed = db.list_mood_entries(user_id).unwrap();
        assert_eq!(listed[0].interests, vec!["bhajans".to_string()]);

        // Stored as serialized JSON inside a TEXT column
        let raw: String = db
            .conn()
            .query_row("SELECT interests FROM mood_entries LIMIT 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, r#"["bhajans"]"#);
    }
}
