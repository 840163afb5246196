use serde::{Deserialize, Serialize};

pub const TASK_EVENT_QUEUE_URL: &str = "TASK_EVENT_QUEUE_URL";

/// Group id for the periodic full rematerialization, matching the
/// scheduled rule that feeds the queue.
pub const SCHEDULED_GROUP_ID: &str = "scheduled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateType {
    Create,
    Update,
    Delete,
}

/// Body of a message on the reminder work queue. The scheduled rule
/// publishes the bare `{"target_type": "ALL"}` form; the change-capture
/// dispatcher publishes one `INDIVIDUAL` message per affected task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target_type")]
pub enum TaskEvent {
    #[serde(rename = "INDIVIDUAL")]
    Individual {
        target_id: String,
        task_id: String,
        update_type: UpdateType,
    },
    #[serde(rename = "ALL")]
    All,
}

impl TaskEvent {
    /// FIFO ordering key: edits to one individual serialize, different
    /// individuals process in parallel, and the resync serializes only
    /// against itself.
    pub fn group_id(&self) -> &str {
        match self {
            TaskEvent::Individual { target_id, .. } => target_id,
            TaskEvent::All => SCHEDULED_GROUP_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scheduled_rule_body() {
        // This is the exact payload the two-hourly rule places on the queue.
        let event: TaskEvent = serde_json::from_str("{\"target_type\": \"ALL\"}").unwrap();
        assert_eq!(event, TaskEvent::All);
        assert_eq!(event.group_id(), SCHEDULED_GROUP_ID);
    }

    #[test]
    fn individual_events_group_by_individual() {
        let event = TaskEvent::Individual {
            target_id: String::from("ind-1"),
            task_id: String::from("task-9"),
            update_type: UpdateType::Update,
        };
        assert_eq!(event.group_id(), "ind-1");

        let body = serde_json::to_string(&event).unwrap();
        assert!(body.contains("\"target_type\":\"INDIVIDUAL\""));
        assert!(body.contains("\"update_type\":\"UPDATE\""));
    }
}
