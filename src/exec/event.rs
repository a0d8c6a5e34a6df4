use serde_json::Value;

/// Sentinel for context fields the engine omitted from an event. Extraction
/// degrades to this rather than aborting the run.
pub const UNKNOWN: &str = "Unknown";

/// Engine bookkeeping keys stripped from every result payload before it is
/// recorded. `changed` is captured separately as a boolean.
const UNWANTED_RESULT_KEYS: [&str; 6] = [
    "warnings",
    "deprecations",
    "_ansible_verbose_override",
    "_ansible_no_log",
    "_ansible_verbose_always",
    "changed",
];

/// One unit of the engine's streamed output, reduced to the kinds the
/// classifier distinguishes. A closed variant: anything the engine emits that
/// the classifier does not act on becomes [`ExecutionEvent::Ignored`], never
/// a silent coercion into another kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    /// The engine started a task. Informational only.
    TaskStart { task_name: String },
    /// A host finished a task, successfully or not.
    HostOutcome(HostOutcome),
    /// The engine's play recap; marks normal completion of the structured
    /// stream.
    RunSummary,
    /// A freeform line outside the structured stream.
    Warning(String),
    /// A structured event of a kind the classifier has no interest in.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostOutcome {
    pub status: OutcomeStatus,
    pub playbook: String,
    pub task_name: String,
    pub task_action: String,
    pub host: String,
    pub host_address: String,
    /// Raw result payload as emitted by the engine.
    pub result: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Ok,
    Failed,
    Unreachable,
}

impl ExecutionEvent {
    /// Parses one raw stdout line from the engine. Lines that are not JSON
    /// are freeform warnings outside the structured stream.
    pub fn from_line(line: &str) -> ExecutionEvent {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => Self::from_value(&value),
            Err(_) => ExecutionEvent::Warning(line.trim().to_string()),
        }
    }

    /// Classifies one structured engine event by its runner `event` kind.
    pub fn from_value(value: &Value) -> ExecutionEvent {
        let kind = value.get("event").and_then(Value::as_str).unwrap_or("");
        match kind {
            "playbook_on_task_start" => ExecutionEvent::TaskStart {
                task_name: context_field(value, "task"),
            },
            "playbook_on_stats" => ExecutionEvent::RunSummary,
            "runner_on_ok" => ExecutionEvent::HostOutcome(outcome(OutcomeStatus::Ok, value)),
            "runner_on_failed" => {
                ExecutionEvent::HostOutcome(outcome(OutcomeStatus::Failed, value))
            }
            "runner_on_unreachable" => {
                ExecutionEvent::HostOutcome(outcome(OutcomeStatus::Unreachable, value))
            }
            _ => ExecutionEvent::Ignored,
        }
    }
}

impl HostOutcome {
    /// Splits the result payload into the separately captured `changed` flag
    /// and the payload with engine bookkeeping keys removed.
    pub fn cleaned_result(&self) -> (Value, bool) {
        let changed = self
            .result
            .get("changed")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let mut data = self.result.clone();
        if let Some(map) = data.as_object_mut() {
            for key in UNWANTED_RESULT_KEYS {
                map.remove(key);
            }
        }
        (data, changed)
    }
}

fn context_field(value: &Value, key: &str) -> String {
    value
        .get("event_data")
        .and_then(|data| data.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn outcome(status: OutcomeStatus, value: &Value) -> HostOutcome {
    HostOutcome {
        status,
        playbook: context_field(value, "playbook"),
        task_name: context_field(value, "task"),
        task_action: context_field(value, "task_action"),
        host: context_field(value, "host"),
        host_address: context_field(value, "remote_addr"),
        result: value
            .get("event_data")
            .and_then(|data| data.get("res"))
            .cloned()
            .unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_json_line_becomes_warning() {
        let event = ExecutionEvent::from_line("[WARNING]: provided hosts list is empty");
        assert_eq!(
            event,
            ExecutionEvent::Warning("[WARNING]: provided hosts list is empty".to_string())
        );
    }

    #[test]
    fn unknown_event_kind_is_ignored_not_coerced() {
        let value = json!({"event": "playbook_on_play_start", "event_data": {}});
        assert_eq!(ExecutionEvent::from_value(&value), ExecutionEvent::Ignored);
    }

    #[test]
    fn missing_context_fields_degrade_to_unknown() {
        let value = json!({"event": "runner_on_ok", "event_data": {"res": {"changed": true}}});
        let ExecutionEvent::HostOutcome(outcome) = ExecutionEvent::from_value(&value) else {
            panic!("expected a host outcome");
        };
        assert_eq!(outcome.task_name, UNKNOWN);
        assert_eq!(outcome.host, UNKNOWN);
        assert_eq!(outcome.host_address, UNKNOWN);
    }

    #[test]
    fn cleaned_result_strips_bookkeeping_and_captures_changed() {
        let value = json!({
            "event": "runner_on_ok",
            "event_data": {
                "host": "web01",
                "res": {
                    "changed": true,
                    "warnings": ["x"],
                    "deprecations": [],
                    "_ansible_no_log": false,
                    "msg": "done"
                }
            }
        });
        let ExecutionEvent::HostOutcome(outcome) = ExecutionEvent::from_value(&value) else {
            panic!("expected a host outcome");
        };
        let (data, changed) = outcome.cleaned_result();
        assert!(changed);
        assert_eq!(data, json!({"msg": "done"}));
    }
}
