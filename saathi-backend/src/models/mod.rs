pub mod emergency_contact;
pub mod mood_entry;
pub mod session;
pub mod user;

pub use emergency_contact::EmergencyContact;
pub use mood_entry::{MoodEntry, MoodStat};
pub use session::Session;
pub use user::User;
