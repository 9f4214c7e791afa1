// Verify wire format matches what the dashboard UI expects.
// Field names are camelCase and absent timestamps are empty strings, never null.

use jobdeck_protocol::{CreateJobRequest, ErrorBody, JobSnapshot, JobsFrame, MessageBody};

fn sample_snapshot() -> JobSnapshot {
    JobSnapshot {
        id: "5b0c7a52-6f5e-4c1f-9a57-2f3f7f6f1a10".into(),
        name: "fast-5s-job".into(),
        tags: vec!["interval".into(), "fast".into()],
        next_run: "2026-10-18T14:30:05Z".into(),
        last_run: String::new(),
        next_runs: vec!["2026-10-18T14:30:05Z".into(), "2026-10-18T14:30:10Z".into()],
        schedule: "Every 5 seconds".into(),
        schedule_detail: "Duration: 5s".into(),
    }
}

#[test]
fn snapshot_uses_camel_case_fields() {
    let json = serde_json::to_string(&sample_snapshot()).unwrap();

    assert!(json.contains(r#""nextRun":"2026-10-18T14:30:05Z""#));
    assert!(json.contains(r#""lastRun":"""#));
    assert!(json.contains(r#""nextRuns":["#));
    assert!(json.contains(r#""scheduleDetail":"Duration: 5s""#));
    assert!(!json.contains("next_run"));
    assert!(!json.contains("null"));
}

#[test]
fn jobs_frame_shape() {
    let frame = JobsFrame::new(vec![sample_snapshot()]);
    let value: serde_json::Value = serde_json::from_str(&frame.to_text().unwrap()).unwrap();

    assert_eq!(value["type"], "jobs");
    assert_eq!(value["data"].as_array().unwrap().len(), 1);
    assert_eq!(value["data"][0]["name"], "fast-5s-job");
}

#[test]
fn empty_jobs_frame_has_empty_array() {
    let text = JobsFrame::new(Vec::new()).to_text().unwrap();
    assert_eq!(text, r#"{"type":"jobs","data":[]}"#);
}

#[test]
fn create_request_full_decode() {
    let json = r#"{"name":"nightly","type":"daily","interval":1,"atTime":"02:15","tags":["ops"]}"#;
    let req: CreateJobRequest = serde_json::from_str(json).unwrap();

    assert_eq!(req.name, "nightly");
    assert_eq!(req.job_type, "daily");
    assert_eq!(req.interval, 1);
    assert_eq!(req.at_time, "02:15");
    assert_eq!(req.tags, vec!["ops".to_string()]);
    assert!(req.cron_expression.is_empty());
}

#[test]
fn create_request_missing_fields_default() {
    let req: CreateJobRequest = serde_json::from_str(r#"{"type":"cron"}"#).unwrap();

    assert!(req.name.is_empty());
    assert_eq!(req.interval, 0);
    assert!(req.tags.is_empty());
}

#[test]
fn create_request_cron_expression_key() {
    let json = r#"{"name":"c","type":"cron","cronExpression":"*/5 * * * *"}"#;
    let req: CreateJobRequest = serde_json::from_str(json).unwrap();
    assert_eq!(req.cron_expression, "*/5 * * * *");
}

#[test]
fn create_request_rejects_wrong_types() {
    let json = r#"{"name":"x","type":"duration","interval":"ten"}"#;
    assert!(serde_json::from_str::<CreateJobRequest>(json).is_err());
}

#[test]
fn message_and_error_bodies() {
    let ok = serde_json::to_string(&MessageBody::new("Job executed")).unwrap();
    assert_eq!(ok, r#"{"message":"Job executed"}"#);

    let err = serde_json::to_string(&ErrorBody::new("Job not found")).unwrap();
    assert_eq!(err, r#"{"error":"Job not found"}"#);
}
