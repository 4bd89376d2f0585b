use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub relationship: String,
    pub is_primary: bool,
    pub created_at: String,
    pub updated_at: String,
}
