//! Shared types for the Saathi backend and the reminder announcer service.

use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// Day-of-week tag as stored in reminder `days` arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Weekday::Sun => "sun",
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sun" => Some(Weekday::Sun),
            "mon" => Some(Weekday::Mon),
            "tue" => Some(Weekday::Tue),
            "wed" => Some(Weekday::Wed),
            "thu" => Some(Weekday::Thu),
            "fri" => Some(Weekday::Fri),
            "sat" => Some(Weekday::Sat),
            _ => None,
        }
    }
}

/// Which announcement template a due reminder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Medicine,
    Birthday,
    Anniversary,
    Spiritual,
    Other,
}

impl ReminderKind {
    /// Memory-aid `type` column values accepted by the API.
    pub const MEMORY_AID_TYPES: [&'static str; 4] =
        ["birthday", "anniversary", "spiritual", "other"];

    pub fn from_memory_aid_type(t: &str) -> Self {
        match t {
            "birthday" => ReminderKind::Birthday,
            "anniversary" => ReminderKind::Anniversary,
            "spiritual" => ReminderKind::Spiritual,
            _ => ReminderKind::Other,
        }
    }
}

/// A medicine reminder row as served by `/api/medicines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineReminder {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// "HH:MM", 24-hour.
    pub time: String,
    /// Empty means every day.
    pub days: Vec<Weekday>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A memory aid row as served by `/api/memory`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryAid {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// "YYYY-MM-DD".
    pub date: String,
    /// Optional reminder time, "HH:MM".
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The unified shape the announcer matches against, regardless of which
/// table a reminder came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDefinition {
    /// Opaque, unique per owner ("medicine-{row}" / "memory-{row}").
    pub id: String,
    pub label: String,
    /// "HH:MM", 24-hour.
    pub scheduled_time: String,
    /// Empty means every day.
    pub active_days: Vec<Weekday>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub kind: ReminderKind,
}

impl MedicineReminder {
    pub fn to_definition(&self) -> ReminderDefinition {
        ReminderDefinition {
            id: format!("medicine-{}", self.id),
            label: self.name.clone(),
            scheduled_time: self.time.clone(),
            active_days: self.days.clone(),
            is_active: self.is_active,
            notes: None,
            kind: ReminderKind::Medicine,
        }
    }
}

impl MemoryAid {
    /// Memory aids without a reminder time are date-only entries and never
    /// enter the matching set. Those with a time match on time alone.
    pub fn to_definition(&self) -> Option<ReminderDefinition> {
        let time = self.time.as_ref()?;
        Some(ReminderDefinition {
            id: format!("memory-{}", self.id),
            label: self.title.clone(),
            scheduled_time: time.clone(),
            active_days: Vec::new(),
            is_active: self.is_active,
            notes: self.notes.clone(),
            kind: ReminderKind::from_memory_aid_type(&self.kind),
        })
    }
}

/// Checks the "HH:MM" 24-hour shape reminders are stored in.
pub fn is_valid_hhmm(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    if ![0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit()) {
        return false;
    }
    let hours = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minutes = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hours < 24 && minutes < 60
}

// =====================================================
// Wire Types
// =====================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicinesResponse {
    pub medicines: Vec<MedicineReminder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryAidsResponse {
    #[serde(rename = "memoryAids")]
    pub memory_aids: Vec<MemoryAid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
    #[serde(rename = "voiceId", skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakResponse {
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_tags_round_trip() {
        for tag in ["sun", "mon", "tue", "wed", "thu", "fri", "sat"] {
            let day = Weekday::from_tag(tag).unwrap();
            assert_eq!(day.as_tag(), tag);
        }
        assert_eq!(Weekday::from_tag("monday"), None);
    }

    #[test]
    fn days_serialize_as_lowercase_tags() {
        let json = serde_json::to_string(&vec![Weekday::Mon, Weekday::Wed]).unwrap();
        assert_eq!(json, r#"["mon","wed"]"#);
        let days: Vec<Weekday> = serde_json::from_str(r#"["tue","sat"]"#).unwrap();
        assert_eq!(days, vec![Weekday::Tue, Weekday::Sat]);
    }

    #[test]
    fn hhmm_validation() {
        assert!(is_valid_hhmm("09:00"));
        assert!(is_valid_hhmm("23:59"));
        assert!(is_valid_hhmm("00:00"));
        assert!(!is_valid_hhmm("24:00"));
        assert!(!is_valid_hhmm("09:60"));
        assert!(!is_valid_hhmm("9:00"));
        assert!(!is_valid_hhmm("09-00"));
        assert!(!is_valid_hhmm("0a:00"));
        assert!(!is_valid_hhmm(""));
    }

    #[test]
    fn medicine_converts_to_definition() {
        let medicine = MedicineReminder {
            id: 7,
            user_id: 1,
            name: "Metformin".to_string(),
            time: "09:00".to_string(),
            days: vec![Weekday::Mon, Weekday::Wed],
            is_active: true,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let def = medicine.to_definition();
        assert_eq!(def.id, "medicine-7");
        assert_eq!(def.kind, ReminderKind::Medicine);
        assert_eq!(def.scheduled_time, "09:00");
        assert_eq!(def.active_days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn memory_aid_without_time_yields_no_definition() {
        let aid = MemoryAid {
            id: 3,
            user_id: 1,
            title: "Anniversary".to_string(),
            date: "2025-06-01".to_string(),
            time: None,
            kind: "anniversary".to_string(),
            notes: None,
            is_active: true,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        assert!(aid.to_definition().is_none());

        let with_time = MemoryAid {
            time: Some("18:30".to_string()),
            ..aid
        };
        let def = with_time.to_definition().unwrap();
        assert_eq!(def.id, "memory-3");
        assert_eq!(def.kind, ReminderKind::Anniversary);
        // Memory aids match on time alone.
        assert!(def.active_days.is_empty());
    }
}
