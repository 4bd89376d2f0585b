//! Announcement text for due reminders.

use reminder_types::{ReminderDefinition, ReminderKind};

pub fn announcement_text(def: &ReminderDefinition) -> String {
    match def.kind {
        ReminderKind::Medicine => format!(
            "Medicine reminder! It's {}. Time to take your {} medicine.",
            def.scheduled_time, def.label
        ),
        _ => {
            let mut message = format!("Memory reminder! {}", def.label);
            if let Some(notes) = &def.notes {
                message.push_str(&format!(". {}", notes));
            }
            match def.kind {
                ReminderKind::Birthday => {
                    message.push_str(". Don't forget to call and wish them!");
                }
                ReminderKind::Anniversary => {
                    message.push_str(". This is an important anniversary!");
                }
                _ => {}
            }
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(label: &str, kind: ReminderKind, notes: Option<&str>) -> ReminderDefinition {
        ReminderDefinition {
            id: "x".to_string(),
            label: label.to_string(),
            scheduled_time: "09:00".to_string(),
            active_days: vec![],
            is_active: true,
            notes: notes.map(|n| n.to_string()),
            kind,
        }
    }

    #[test]
    fn medicine_template_includes_time_and_name() {
        let text = announcement_text(&def("Metformin", ReminderKind::Medicine, None));
        assert_eq!(
            text,
            "Medicine reminder! It's 09:00. Time to take your Metformin medicine."
        );
    }

    #[test]
    fn birthday_template_appends_notes_and_suffix() {
        let text = announcement_text(&def(
            "Ravi's birthday",
            ReminderKind::Birthday,
            Some("He turns 40"),
        ));
        assert_eq!(
            text,
            "Memory reminder! Ravi's birthday. He turns 40. Don't forget to call and wish them!"
        );
    }

    #[test]
    fn other_kinds_get_no_suffix() {
        let text = announcement_text(&def("Water the plants", ReminderKind::Other, None));
        assert_eq!(text, "Memory reminder! Water the plants");
    }
}
