use aws_lambda_events::event::dynamodb::{Event as DynamoDbEvent, EventRecord};
use aws_sdk_sqs as sqs;
use enablr_core::events::{TaskEvent, UpdateType, TASK_EVENT_QUEUE_URL};
use enablr_core::types::AssignedTask;
use enablr_core::{clients, Error};
use lambda_runtime::LambdaEvent;
use serde::Deserialize;
use std::env;
use tracing::info;

/// SQS caps batch sends at 10 entries.
const MAX_SQS_BATCH: usize = 10;

#[derive(Debug, Deserialize)]
struct IndividualKey {
    individual_id: String,
}

/// Only the task list matters here; the rest of the image is ignored.
#[derive(Debug, Default, Deserialize)]
struct TaskListImage {
    #[serde(default)]
    tasks: Vec<AssignedTask>,
}

/// Classify the difference between two assigned-task lists: newly
/// assigned tasks, tasks whose schedule details changed, and tasks that
/// were taken away.
pub fn diff_tasks(old: &[AssignedTask], new: &[AssignedTask]) -> Vec<(String, UpdateType)> {
    let mut changes = Vec::new();
    for task in new {
        match old.iter().find(|o| o.task_id == task.task_id) {
            None => changes.push((task.task_id.clone(), UpdateType::Create)),
            Some(existing) if existing.details != task.details => {
                changes.push((task.task_id.clone(), UpdateType::Update))
            }
            Some(_) => {}
        }
    }
    for task in old {
        if !new.iter().any(|n| n.task_id == task.task_id) {
            changes.push((task.task_id.clone(), UpdateType::Delete));
        }
    }
    changes
}

/// The individual id and task-list changes carried by one stream record.
fn record_changes(record: &EventRecord) -> Result<(String, Vec<(String, UpdateType)>), Error> {
    let key: IndividualKey = serde_dynamo::from_item(record.change.keys.clone())?;
    let (old, new) = match record.event_name.as_str() {
        "MODIFY" => (
            serde_dynamo::from_item(record.change.old_image.clone())?,
            serde_dynamo::from_item(record.change.new_image.clone())?,
        ),
        "REMOVE" => (
            serde_dynamo::from_item(record.change.old_image.clone())?,
            TaskListImage::default(),
        ),
        _ => (
            TaskListImage::default(),
            serde_dynamo::from_item(record.change.new_image.clone())?,
        ),
    };
    Ok((key.individual_id, diff_tasks(&old.tasks, &new.tasks)))
}

/// One queue entry per changed task, grouped by the individual so edits
/// to one individual stay ordered while different individuals fan out.
pub fn task_event_entries(
    individual_id: &str,
    changes: &[(String, UpdateType)],
) -> Result<Vec<sqs::model::SendMessageBatchRequestEntry>, Error> {
    changes
        .iter()
        .map(|(task_id, update_type)| {
            let event = TaskEvent::Individual {
                target_id: individual_id.to_owned(),
                task_id: task_id.clone(),
                update_type: *update_type,
            };
            let entry_id = uuid::Uuid::new_v4().to_string();
            Ok(sqs::model::SendMessageBatchRequestEntry::builder()
                .id(entry_id.clone())
                .message_body(serde_json::to_string(&event)?)
                .message_group_id(event.group_id())
                .message_deduplication_id(entry_id)
                .build())
        })
        .collect()
}

pub async fn function_handler(event: LambdaEvent<DynamoDbEvent>) -> Result<(), Error> {
    let queue_url = env::var(TASK_EVENT_QUEUE_URL)?;
    let config = clients::load_config().await;
    let sqs_client = sqs::Client::new(&config);

    for record in &event.payload.records {
        let (individual_id, changes) = record_changes(record)?;
        if changes.is_empty() {
            continue;
        }
        info!(
            "publishing {} task events for {}",
            changes.len(),
            individual_id
        );
        let entries = task_event_entries(&individual_id, &changes)?;
        for chunk in entries.chunks(MAX_SQS_BATCH) {
            sqs_client
                .send_message_batch()
                .queue_url(queue_url.clone())
                .set_entries(Some(chunk.to_vec()))
                .send()
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enablr_core::types::{TaskDetails, TimeOfDay};

    fn task(task_id: &str, frequency: u32) -> AssignedTask {
        AssignedTask {
            task_id: task_id.to_owned(),
            details: TaskDetails {
                name: String::from("Medication"),
                description: String::from("With food"),
                frequency,
                start_time: TimeOfDay { h: 8, m: 0 },
                end_time: TimeOfDay { h: 20, m: 0 },
            },
        }
    }

    #[test]
    fn added_tasks_produce_create_events() {
        let changes = diff_tasks(&[], &[task("a", 2)]);
        assert_eq!(changes, vec![(String::from("a"), UpdateType::Create)]);
    }

    #[test]
    fn changed_details_produce_update_events() {
        let changes = diff_tasks(&[task("a", 2)], &[task("a", 3)]);
        assert_eq!(changes, vec![(String::from("a"), UpdateType::Update)]);
    }

    #[test]
    fn unchanged_tasks_produce_nothing() {
        let changes = diff_tasks(&[task("a", 2)], &[task("a", 2)]);
        assert!(changes.is_empty());
    }

    #[test]
    fn removed_tasks_produce_delete_events() {
        let changes = diff_tasks(&[task("a", 2), task("b", 1)], &[task("a", 2)]);
        assert_eq!(changes, vec![(String::from("b"), UpdateType::Delete)]);
    }

    #[test]
    fn mixed_edits_classify_each_task() {
        let old = vec![task("keep", 1), task("edit", 2), task("drop", 3)];
        let new = vec![task("keep", 1), task("edit", 4), task("add", 1)];
        let changes = diff_tasks(&old, &new);
        assert!(changes.contains(&(String::from("edit"), UpdateType::Update)));
        assert!(changes.contains(&(String::from("add"), UpdateType::Create)));
        assert!(changes.contains(&(String::from("drop"), UpdateType::Delete)));
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn entries_group_by_individual() {
        let changes = vec![
            (String::from("a"), UpdateType::Create),
            (String::from("b"), UpdateType::Delete),
        ];
        let entries = task_event_entries("ind-1", &changes).unwrap();
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.message_group_id(), Some("ind-1"));
            // each entry carries its own dedup id
            assert_eq!(entry.message_deduplication_id(), entry.id());
        }

        let other = task_event_entries("ind-2", &changes).unwrap();
        assert_ne!(
            entries[0].message_group_id(),
            other[0].message_group_id()
        );
    }

    #[test]
    fn entry_bodies_parse_back_into_task_events() {
        let changes = vec![(String::from("task-9"), UpdateType::Update)];
        let entries = task_event_entries("ind-1", &changes).unwrap();
        let body: TaskEvent = serde_json::from_str(entries[0].message_body().unwrap()).unwrap();
        assert_eq!(
            body,
            TaskEvent::Individual {
                target_id: String::from("ind-1"),
                task_id: String::from("task-9"),
                update_type: UpdateType::Update,
            }
        );
    }
}
