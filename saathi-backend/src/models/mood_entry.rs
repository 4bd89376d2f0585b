use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: i64,
    /// sad, normal, happy
    pub mood: String,
    /// music, quote, joke, trivia
    pub activity_type: Option<String>,
    pub activity_content: Option<String>,
    pub interests: Vec<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Per-mood share of recent entries, for `/api/mood/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct MoodStat {
    pub mood: String,
    pub count: i64,
    pub percentage: i64,
}
