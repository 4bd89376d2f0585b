//! Due-reminder matching.
//!
//! A reminder is due when its scheduled minute equals the sampled wall-clock
//! minute on a day it is configured to run. Matching is a pure function of
//! the definition set and the sampled instant; the caller re-fetches the
//! authoritative set every tick.

use chrono::{DateTime, Datelike, Local};
use reminder_types::{ReminderDefinition, Weekday};

pub fn weekday_tag(now: &DateTime<Local>) -> Weekday {
    match now.weekday() {
        chrono::Weekday::Sun => Weekday::Sun,
        chrono::Weekday::Mon => Weekday::Mon,
        chrono::Weekday::Tue => Weekday::Tue,
        chrono::Weekday::Wed => Weekday::Wed,
        chrono::Weekday::Thu => Weekday::Thu,
        chrono::Weekday::Fri => Weekday::Fri,
        chrono::Weekday::Sat => Weekday::Sat,
    }
}

/// Every active definition whose scheduled time equals the current minute,
/// on a matching day. Order-preserving with respect to `definitions`; all
/// same-time matches are returned.
///
/// Minutes are compared as exact string equality. A definition scheduled in
/// the past within the same day never retroactively fires, and a minute the
/// caller happens not to sample is silently missed.
pub fn find_due<'a>(
    definitions: &'a [ReminderDefinition],
    now: &DateTime<Local>,
) -> Vec<&'a ReminderDefinition> {
    let current_time = now.format("%H:%M").to_string();
    let current_day = weekday_tag(now);

    definitions
        .iter()
        .filter(|def| {
            def.is_active
                && def.scheduled_time == current_time
                && (def.active_days.is_empty() || def.active_days.contains(&current_day))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reminder_types::ReminderKind;

    fn def(id: &str, time: &str, days: Vec<Weekday>, is_active: bool) -> ReminderDefinition {
        ReminderDefinition {
            id: id.to_string(),
            label: id.to_string(),
            scheduled_time: time.to_string(),
            active_days: days,
            is_active,
            notes: None,
            kind: ReminderKind::Medicine,
        }
    }

    // 2025-06-02 is a Monday, 2025-06-03 a Tuesday.
    fn monday_at(hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
    }

    fn tuesday_at(hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 3, hour, min, 0).unwrap()
    }

    #[test]
    fn inactive_definitions_never_match() {
        let defs = vec![def("a", "09:00", vec![], false)];
        assert!(find_due(&defs, &monday_at(9, 0)).is_empty());
    }

    #[test]
    fn empty_days_matches_every_day() {
        let defs = vec![def("a", "09:00", vec![], true)];
        assert_eq!(find_due(&defs, &monday_at(9, 0)).len(), 1);
        assert_eq!(find_due(&defs, &tuesday_at(9, 0)).len(), 1);
    }

    #[test]
    fn day_restricted_definition_only_fires_on_its_days() {
        let defs = vec![def("a", "09:00", vec![Weekday::Mon, Weekday::Wed], true)];
        assert!(find_due(&defs, &tuesday_at(9, 0)).is_empty());
        assert_eq!(find_due(&defs, &monday_at(9, 0)).len(), 1);
    }

    #[test]
    fn past_times_do_not_retroactively_fire() {
        let defs = vec![def("a", "09:00", vec![], true)];
        assert!(find_due(&defs, &monday_at(9, 1)).is_empty());
        assert!(find_due(&defs, &monday_at(14, 0)).is_empty());
    }

    #[test]
    fn all_same_time_matches_are_returned_in_input_order() {
        let defs = vec![
            def("first", "09:00", vec![], true),
            def("skipped", "10:00", vec![], true),
            def("second", "09:00", vec![], true),
        ];
        let due = find_due(&defs, &monday_at(9, 0));
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn mixed_day_scoping_on_a_tuesday() {
        let defs = vec![
            def("everyday", "09:00", vec![], true),
            def("tuesdays", "09:00", vec![Weekday::Tue], true),
        ];
        let due = find_due(&defs, &tuesday_at(9, 0));
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["everyday", "tuesdays"]);
    }
}
