use serde::{Deserialize, Serialize};

/// Wall-clock time within a day, stored as `{h, m}` maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub h: u32,
    pub m: u32,
}

/// A task template: how often it happens and the window it happens in.
/// Attribute names are camelCase because the frontend reads these maps
/// straight out of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub name: String,
    pub description: String,
    pub frequency: u32,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

/// A task assigned to an individual. The details are a per-assignment
/// copy of the catalog entry, so editing the catalog never rewrites
/// existing assignments behind the supporter's back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub task_id: String,
    pub details: TaskDetails,
}

/// A catalog entry from the global task table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTask {
    pub task_id: String,
    pub details: TaskDetails,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualDetails {
    pub first_name: String,
    pub last_name: String,
    pub birthday: String,
    // stored as `tz`; the details form still posts it as `timezone`
    #[serde(alias = "timezone")]
    pub tz: String,
    pub primary_color: String,
    pub secondary_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub individual_id: String,
    pub details: IndividualDetails,
    #[serde(default)]
    pub tasks: Vec<AssignedTask>,
}

/// One materialized occurrence of a task for an individual. Keyed by
/// (`reminder_id`, `due`); `details` is a denormalized snapshot so device
/// and frontend reads need no join against the individual table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub reminder_id: String,
    pub task_id: String,
    pub individual_id: String,
    pub due: i64,
    pub readable_timestamp: String,
    pub details: TaskDetails,
    pub completed: bool,
    pub note: String,
}

pub fn reminder_key(individual_id: &str, task_id: &str) -> String {
    format!("{}-{}", individual_id, task_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    Primary,
    Secondary,
    Tertiary,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    pub individual_id: String,
    pub supporter_id: String,
    pub relationship: Relationship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupporterDetails {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupporterRecord {
    pub supporter_id: String,
    pub email: String,
    pub details: SupporterDetails,
    #[serde(rename = "shareIdentifier")]
    pub share_identifier: String,
}

/// A device registration. Starts life as a bare one-hour code; binding a
/// device fills in `device_id`/`device_name`, revocation sets `revoked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub registration_id: String,
    pub individual_id: String,
    pub expiry: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked: Option<String>,
}

impl RegistrationRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiry <= now
    }

    pub fn is_bound(&self) -> bool {
        self.device_id.is_some()
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked.is_some()
    }

    /// A code can be exchanged for a token only while unexpired and not
    /// already claimed by another device.
    pub fn can_register(&self, now: i64) -> bool {
        !self.is_expired(now) && !self.is_bound()
    }

    /// A bound registration keeps working until it is revoked.
    pub fn is_active(&self) -> bool {
        self.is_bound() && !self.is_revoked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegistrationRecord {
        RegistrationRecord {
            registration_id: String::from("reg-1"),
            individual_id: String::from("ind-1"),
            expiry: 1_000,
            device_id: None,
            device_name: None,
            revoked: None,
        }
    }

    #[test]
    fn fresh_code_can_register() {
        let reg = registration();
        assert!(reg.can_register(999));
        assert!(!reg.is_active());
    }

    #[test]
    fn expired_code_cannot_register() {
        let reg = registration();
        assert!(!reg.can_register(1_000));
        assert!(!reg.can_register(5_000));
    }

    #[test]
    fn bound_code_cannot_register_again() {
        let mut reg = registration();
        reg.device_id = Some(String::from("device-1"));
        assert!(!reg.can_register(0));
        assert!(reg.is_active());
    }

    #[test]
    fn revoked_registration_is_inactive() {
        let mut reg = registration();
        reg.device_id = Some(String::from("device-1"));
        reg.revoked = Some(String::from("REVOKED"));
        assert!(!reg.is_active());
    }

    #[test]
    fn relationship_uses_stored_spelling() {
        let json = serde_json::to_string(&Relationship::Primary).unwrap();
        assert_eq!(json, "\"PRIMARY\"");
        let parsed: Relationship = serde_json::from_str("\"TERTIARY\"").unwrap();
        assert_eq!(parsed, Relationship::Tertiary);
    }

    #[test]
    fn reminder_key_joins_ids() {
        assert_eq!(reminder_key("ind-1", "task-2"), "ind-1-task-2");
    }
}
