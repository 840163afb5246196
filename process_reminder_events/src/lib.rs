use aws_lambda_events::event::sqs::SqsEvent;
use aws_sdk_dynamodb as ddb;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use enablr_core::events::{TaskEvent, UpdateType};
use enablr_core::types::{reminder_key, AssignedTask, IndividualRecord, Reminder};
use enablr_core::{clients, individuals, reminders, DomainError, Error};
use lambda_runtime::LambdaEvent;
use std::collections::HashSet;
use tracing::info;

/// Due timestamps for one day of a task: `frequency` occurrences spread
/// evenly across `[start, end]`, first at `start`, last at `end`.
/// Integer spacing keeps the count exact regardless of window length.
pub fn occurrence_times(start: i64, end: i64, frequency: u32) -> Vec<i64> {
    if frequency == 0 {
        return Vec::new();
    }
    if frequency == 1 || end <= start {
        return vec![start];
    }
    let span = end - start;
    let gaps = (frequency - 1) as i64;
    (0..frequency as i64)
        .map(|i| start + span * i / gaps)
        .collect()
}

/// The task window for the current day in the individual's timezone,
/// as (start, end) epoch seconds. Times that don't exist locally (DST
/// spring-forward) resolve to the earliest valid instant.
pub fn day_window(task: &AssignedTask, tz: Tz, now: DateTime<Utc>) -> Result<(i64, i64), Error> {
    let today = now.with_timezone(&tz).date_naive();
    let at = |h: u32, m: u32| -> Result<i64, Error> {
        let local = today
            .and_hms_opt(h, m, 0)
            .ok_or_else(|| DomainError::new(format!("invalid time of day {}:{}", h, m)))?;
        let resolved = tz
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| DomainError::new(format!("unrepresentable local time {}", local)))?;
        Ok(resolved.timestamp())
    };
    Ok((
        at(task.details.start_time.h, task.details.start_time.m)?,
        at(task.details.end_time.h, task.details.end_time.m)?,
    ))
}

/// The rows to write for one (individual, task) today. Occurrences that
/// have already passed are skipped, as are ones whose key matches a
/// surviving completed row, so regenerating an unchanged schedule
/// rewrites only rows identical to the ones it deleted.
pub fn plan_occurrences(
    individual_id: &str,
    task: &AssignedTask,
    tz: Tz,
    now: DateTime<Utc>,
    completed_due: &HashSet<i64>,
) -> Result<Vec<Reminder>, Error> {
    let (start, end) = day_window(task, tz, now)?;
    let mut rows = Vec::new();
    for due in occurrence_times(start, end, task.details.frequency) {
        if due <= now.timestamp() {
            continue;
        }
        if completed_due.contains(&due) {
            continue;
        }
        let readable = match tz.timestamp_opt(due, 0) {
            chrono::LocalResult::Single(t) => t.to_rfc3339(),
            _ => String::new(),
        };
        rows.push(Reminder {
            reminder_id: reminder_key(individual_id, &task.task_id),
            task_id: task.task_id.clone(),
            individual_id: individual_id.to_owned(),
            due,
            readable_timestamp: readable,
            details: task.details.clone(),
            completed: false,
            note: String::new(),
        });
    }
    Ok(rows)
}

/// Partition the future rows under a key into the pending ones (safe to
/// delete and regenerate) and the due timestamps of completed ones
/// (state the device wrote; never clobbered).
pub fn split_future(existing: Vec<Reminder>) -> (Vec<Reminder>, HashSet<i64>) {
    let mut pending = Vec::new();
    let mut completed_due = HashSet::new();
    for reminder in existing {
        if reminder.completed {
            completed_due.insert(reminder.due);
        } else {
            pending.push(reminder);
        }
    }
    (pending, completed_due)
}

fn parse_tz(individual: &IndividualRecord) -> Result<Tz, Error> {
    individual.details.tz.parse().map_err(|_| {
        DomainError::new(format!(
            "individual {} has unknown timezone {}",
            individual.individual_id, individual.details.tz
        ))
        .into()
    })
}

/// Apply one schedule change: drop future pending rows (DELETE/UPDATE),
/// then regenerate today's occurrences (CREATE/UPDATE). The two steps
/// are separate writes; a crash in between leaves a partial day until
/// the next delivery or the scheduled resync replays the key.
async fn handle_task_event(
    client: &ddb::Client,
    target_id: &str,
    task_id: &str,
    update_type: UpdateType,
    individual: Option<&IndividualRecord>,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let reminder_id = reminder_key(target_id, task_id);
    let existing = reminders::query_future(client, &reminder_id, now.timestamp()).await?;
    let (pending, completed_due) = split_future(existing);

    if matches!(update_type, UpdateType::Delete | UpdateType::Update) && !pending.is_empty() {
        info!(
            "removing {} pending reminders for {}",
            pending.len(),
            reminder_id
        );
        let deletes = pending.iter().map(reminders::delete_request).collect();
        reminders::write_reminder_batches(client, deletes).await?;
    }

    if matches!(update_type, UpdateType::Create | UpdateType::Update) {
        let fetched;
        let individual = match individual {
            Some(record) => record,
            None => {
                fetched = individuals::get_individual(client, target_id).await?;
                &fetched
            }
        };
        match individual.tasks.iter().find(|t| t.task_id == task_id) {
            Some(task) => {
                let tz = parse_tz(individual)?;
                let rows = plan_occurrences(target_id, task, tz, now, &completed_due)?;
                info!("writing {} reminders for {}", rows.len(), reminder_id);
                let puts = rows
                    .iter()
                    .map(reminders::put_request)
                    .collect::<Result<Vec<_>, Error>>()?;
                reminders::write_reminder_batches(client, puts).await?;
            }
            None => info!(
                "task {} no longer assigned to {}, nothing to materialize",
                task_id, target_id
            ),
        }
    }

    Ok(())
}

pub async fn function_handler(event: LambdaEvent<SqsEvent>) -> Result<(), Error> {
    let config = clients::load_config().await;
    let ddb_client = clients::ddb_client_with(&config);
    let now = Utc::now();

    for record in event.payload.records {
        let body = record.body.as_deref().unwrap_or_default();
        let task_event: TaskEvent = serde_json::from_str(body)?;
        info!("processing {:?}", task_event);
        match task_event {
            TaskEvent::Individual {
                target_id,
                task_id,
                update_type,
            } => handle_task_event(&ddb_client, &target_id, &task_id, update_type, None, now).await?,
            TaskEvent::All => {
                let everyone = individuals::scan_individuals(&ddb_client).await?;
                info!("rematerializing {} individuals", everyone.len());
                for individual in &everyone {
                    for task in &individual.tasks {
                        handle_task_event(
                            &ddb_client,
                            &individual.individual_id,
                            &task.task_id,
                            UpdateType::Update,
                            Some(individual),
                            now,
                        )
                        .await?;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enablr_core::types::{TaskDetails, TimeOfDay};

    const SYDNEY: Tz = chrono_tz::Australia::Sydney;

    fn task(frequency: u32, start: (u32, u32), end: (u32, u32)) -> AssignedTask {
        AssignedTask {
            task_id: String::from("task-1"),
            details: TaskDetails {
                name: String::from("Brush teeth"),
                description: String::from("Two minutes, all surfaces"),
                frequency,
                start_time: TimeOfDay {
                    h: start.0,
                    m: start.1,
                },
                end_time: TimeOfDay { h: end.0, m: end.1 },
            },
        }
    }

    fn sydney(h: u32, m: u32) -> i64 {
        SYDNEY
            .with_ymd_and_hms(2023, 3, 6, h, m, 0)
            .unwrap()
            .timestamp()
    }

    fn sydney_now(h: u32, m: u32) -> DateTime<Utc> {
        SYDNEY
            .with_ymd_and_hms(2023, 3, 6, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn spreads_occurrences_evenly() {
        let times = occurrence_times(800, 2_000, 4);
        assert_eq!(times, vec![800, 1_200, 1_600, 2_000]);
    }

    #[test]
    fn count_matches_frequency_exactly() {
        for frequency in 1..20 {
            let times = occurrence_times(0, 86_399, frequency);
            assert_eq!(times.len(), frequency as usize);
        }
    }

    #[test]
    fn single_occurrence_lands_at_window_start() {
        assert_eq!(occurrence_times(500, 9_999, 1), vec![500]);
    }

    #[test]
    fn three_a_day_lands_at_eight_fourteen_twenty() {
        let task = task(3, (8, 0), (20, 0));
        let rows =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(1, 0), &HashSet::new()).unwrap();
        let dues: Vec<i64> = rows.iter().map(|r| r.due).collect();
        assert_eq!(dues, vec![sydney(8, 0), sydney(14, 0), sydney(20, 0)]);
    }

    #[test]
    fn past_occurrences_are_not_rematerialized() {
        let task = task(3, (8, 0), (20, 0));
        let rows =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(15, 0), &HashSet::new()).unwrap();
        let dues: Vec<i64> = rows.iter().map(|r| r.due).collect();
        assert_eq!(dues, vec![sydney(20, 0)]);
    }

    #[test]
    fn completed_rows_are_left_alone() {
        let task = task(3, (8, 0), (20, 0));
        let completed: HashSet<i64> = [sydney(14, 0)].into_iter().collect();
        let rows = plan_occurrences("ind-1", &task, SYDNEY, sydney_now(1, 0), &completed).unwrap();
        let dues: Vec<i64> = rows.iter().map(|r| r.due).collect();
        assert_eq!(dues, vec![sydney(8, 0), sydney(20, 0)]);
    }

    #[test]
    fn planning_is_idempotent() {
        let task = task(5, (7, 30), (21, 15));
        let first =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(5, 0), &HashSet::new()).unwrap();
        let second =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(5, 0), &HashSet::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn rows_carry_denormalized_details() {
        let task = task(1, (9, 0), (9, 0));
        let rows =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(1, 0), &HashSet::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reminder_id, "ind-1-task-1");
        assert_eq!(rows[0].details, task.details);
        assert!(!rows[0].completed);
        assert!(rows[0].note.is_empty());
        assert!(!rows[0].readable_timestamp.is_empty());
    }

    #[test]
    fn split_future_partitions_by_completion() {
        let task = task(2, (8, 0), (20, 0));
        let mut rows =
            plan_occurrences("ind-1", &task, SYDNEY, sydney_now(1, 0), &HashSet::new()).unwrap();
        rows[1].completed = true;
        let first_due = rows[0].due;
        let second_due = rows[1].due;

        let (pending, completed_due) = split_future(rows);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].due, first_due);
        assert_eq!(completed_due, [second_due].into_iter().collect());
    }
}
