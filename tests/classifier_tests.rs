use homelab_deploy::exec::{classify, ExecutionError, ExecutionEvent};
use serde_json::json;
use std::cell::Cell;

fn task_start(name: &str) -> ExecutionEvent {
    ExecutionEvent::from_value(&json!({
        "event": "playbook_on_task_start",
        "event_data": {"task": name}
    }))
}

fn host_event(kind: &str, task: &str, host: &str, res: serde_json::Value) -> ExecutionEvent {
    ExecutionEvent::from_value(&json!({
        "event": kind,
        "event_data": {
            "playbook": "playbook.yaml",
            "task": task,
            "task_action": "command",
            "host": host,
            "remote_addr": "192.168.1.10",
            "res": res
        }
    }))
}

fn summary() -> ExecutionEvent {
    ExecutionEvent::from_value(&json!({"event": "playbook_on_stats", "event_data": {}}))
}

#[test]
fn ok_only_stream_yields_a_complete_report() {
    let events = vec![
        task_start("Install packages"),
        host_event(
            "runner_on_ok",
            "Install packages",
            "web01",
            json!({"changed": true, "warnings": [], "msg": "installed"}),
        ),
        ExecutionEvent::Warning("[WARNING]: something benign".to_string()),
        host_event(
            "runner_on_ok",
            "Install packages",
            "web02",
            json!({"changed": false}),
        ),
        summary(),
    ];

    let report = classify("base", events, 0).unwrap();
    assert_eq!(report.module(), "base");
    assert_eq!(report.hosts().collect::<Vec<_>>(), vec!["web01", "web02"]);
    assert_eq!(report.task_count(), 2);
    assert_eq!(report.changed_count(), 1);

    let result = &report.results_for("web01")[0];
    assert_eq!(result.task_name, "Install packages");
    assert!(result.changed);
    // Bookkeeping keys are stripped, the payload of interest survives.
    assert_eq!(result.result_data, json!({"msg": "installed"}));
}

#[test]
fn failed_outcome_aborts_with_attributed_context() {
    let events = vec![
        task_start("Restart service"),
        host_event(
            "runner_on_failed",
            "Restart service",
            "db01",
            json!({"msg": "unit not found"}),
        ),
    ];

    let err = classify("database", events, 2).unwrap_err();
    let ExecutionError::ModuleRun {
        module,
        task_name,
        host,
        detail,
        ..
    } = &err
    else {
        panic!("expected a module-run failure, got: {err:?}");
    };
    assert_eq!(module, "database");
    assert_eq!(task_name, "Restart service");
    assert_eq!(host, "db01");
    assert!(detail.contains("unit not found"));
}

#[test]
fn no_events_are_consumed_after_the_failure() {
    let events = vec![
        host_event("runner_on_ok", "t1", "h1", json!({"changed": false})),
        host_event("runner_on_failed", "t2", "h1", json!({"msg": "boom"})),
        host_event("runner_on_ok", "t3", "h1", json!({"changed": false})),
        summary(),
    ];

    let consumed = Cell::new(0usize);
    let stream = events.into_iter().inspect(|_| consumed.set(consumed.get() + 1));
    assert!(classify("base", stream, 2).is_err());
    assert_eq!(consumed.get(), 2, "classifier must stop at the failure");
}

#[test]
fn unreachable_host_aborts_like_a_failure() {
    let events = vec![host_event(
        "runner_on_unreachable",
        "Gather facts",
        "nas01",
        json!({"msg": "Failed to connect to the host via ssh"}),
    )];

    let err = classify("storage", events, 4).unwrap_err();
    assert!(matches!(err, ExecutionError::ModuleRun { .. }));
    assert!(err.to_string().contains("nas01"));
}

#[test]
fn nonzero_exit_without_failure_events_is_unexplained() {
    let events = vec![
        host_event("runner_on_ok", "t1", "h1", json!({"changed": false})),
        summary(),
    ];

    let err = classify("base", events, 1).unwrap_err();
    let ExecutionError::Unexplained { module, exit_code } = &err else {
        panic!("expected an unexplained failure, got: {err:?}");
    };
    assert_eq!(module, "base");
    assert_eq!(*exit_code, 1);
}

#[test]
fn missing_context_degrades_to_unknown_sentinels() {
    let events = vec![ExecutionEvent::from_value(&json!({
        "event": "runner_on_ok",
        "event_data": {"res": {"changed": true}}
    }))];

    let report = classify("base", events, 0).unwrap();
    let result = &report.results_for("Unknown")[0];
    assert_eq!(result.task_name, "Unknown");
    assert_eq!(result.task_action, "Unknown");
    assert_eq!(result.host_address, "Unknown");
    assert!(result.changed);
}

#[test]
fn warnings_and_unknown_event_kinds_never_fail_a_run() {
    let events = vec![
        ExecutionEvent::Warning("unattributed line before any event".to_string()),
        ExecutionEvent::from_value(&json!({"event": "playbook_on_play_start"})),
        host_event("runner_on_ok", "t1", "h1", json!({"changed": false})),
    ];

    let report = classify("base", events, 0).unwrap();
    assert_eq!(report.task_count(), 1);
}

#[test]
fn empty_stream_with_clean_exit_is_an_empty_report() {
    let report = classify("base", Vec::new(), 0).unwrap();
    assert_eq!(report.task_count(), 0);
    assert_eq!(report.hosts().count(), 0);
}
