use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::LambdaEvent;

#[test]
fn test_empty_batch() {
    let future = process_reminder_events::function_handler(LambdaEvent {
        payload: SqsEvent { records: vec![] },
        context: Default::default(),
    });
    let res = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future);
    println!("handler returned {:#?}", res)
}
