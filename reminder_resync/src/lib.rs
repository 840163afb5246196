use aws_lambda_events::event::cloudwatch_events::CloudWatchEvent;
use aws_sdk_sqs as sqs;
use enablr_core::events::{TaskEvent, SCHEDULED_GROUP_ID, TASK_EVENT_QUEUE_URL};
use enablr_core::{clients, Error};
use lambda_runtime::LambdaEvent;
use std::env;
use tracing::info;
use uuid::Uuid;

/// Fires every two hours: one "regenerate everyone" message, on the
/// fixed scheduled group so consecutive resyncs serialize. This is the
/// self-healing path for stream events that never made it through.
pub async fn function_handler(_event: LambdaEvent<CloudWatchEvent>) -> Result<(), Error> {
    let queue_url = env::var(TASK_EVENT_QUEUE_URL)?;
    let config = clients::load_config().await;
    let sqs_client = sqs::Client::new(&config);

    sqs_client
        .send_message()
        .queue_url(queue_url)
        .message_body(serde_json::to_string(&TaskEvent::All)?)
        .message_group_id(SCHEDULED_GROUP_ID)
        .message_deduplication_id(Uuid::new_v4().to_string())
        .send()
        .await?;

    info!("queued full reminder rematerialization");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resync_body_matches_queue_contract() {
        // The materializer matches on this exact shape.
        let body = serde_json::to_string(&TaskEvent::All).unwrap();
        assert_eq!(body, "{\"target_type\":\"ALL\"}");
    }
}
