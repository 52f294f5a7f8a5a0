//! Common test utilities for building workflows, analyses and analyzers.
use async_trait::async_trait;
use serde_json::{Value, json};
use shinsa::prelude::*;
use std::sync::Mutex;

/// A small n8n-style workflow with an HTTP node missing its URL.
#[allow(dead_code)]
pub fn create_sample_workflow() -> Value {
    json!({
        "name": "Daily report",
        "nodes": [
            {
                "id": "1",
                "name": "Schedule",
                "type": "n8n-nodes-base.scheduleTrigger",
                "parameters": { "rule": { "interval": [{ "field": "days" }] } }
            },
            {
                "id": "2",
                "name": "Fetch stats",
                "type": "n8n-nodes-base.httpRequest",
                "parameters": { "method": "GET" }
            }
        ],
        "connections": {
            "Schedule": { "main": [[{ "node": "Fetch stats", "type": "main", "index": 0 }]] }
        }
    })
}

/// Builds an issue with a patch writing `new_value` at `path`.
#[allow(dead_code)]
pub fn create_issue(id: &str, path: &str, new_value: Value, requires_user_input: bool) -> IssueRecord {
    IssueRecord {
        id: id.to_string(),
        severity: Severity::Warning,
        description: format!("Issue {}", id),
        impact: "Something breaks".to_string(),
        recommendation: "Apply the fix".to_string(),
        node_id: None,
        patch: Patch {
            path: path.to_string(),
            new_value,
            requires_user_input,
        },
    }
}

/// An analysis of `create_sample_workflow` with three issues, one needing user input.
#[allow(dead_code)]
pub fn create_sample_analysis() -> AnalysisResult {
    let mut missing_url = create_issue(
        "missing-url",
        "nodes[1].parameters.url",
        json!("https://api.example.com/stats"),
        false,
    );
    missing_url.severity = Severity::Critical;
    missing_url.node_id = Some("2".to_string());

    let mut missing_token = create_issue(
        "missing-token",
        "nodes[1].parameters.headers.Authorization",
        json!("Bearer <YOUR_TOKEN>"),
        true,
    );
    missing_token.node_id = Some("2".to_string());

    let mut timezone = create_issue(
        "timezone",
        "settings.timezone",
        json!("UTC"),
        false,
    );
    timezone.severity = Severity::Info;

    AnalysisResult {
        is_valid: false,
        summary: WorkflowSummary {
            accomplishment: "Fetches daily statistics".to_string(),
            trigger: "Runs every day".to_string(),
            final_outcome: "Statistics are downloaded".to_string(),
            analogy: "Like a newspaper delivered each morning".to_string(),
        },
        text_flow: "Schedule -> Fetch stats".to_string(),
        node_breakdowns: vec![
            NodeBreakdown {
                id: "1".to_string(),
                name: "Schedule".to_string(),
                purpose: "Starts the workflow daily".to_string(),
                inputs_required: vec![],
                configuration_notes: "Interval: days".to_string(),
                output: "A tick".to_string(),
                analogy: "An alarm clock".to_string(),
            },
            NodeBreakdown {
                id: "2".to_string(),
                name: "Fetch stats".to_string(),
                purpose: "Downloads statistics".to_string(),
                inputs_required: vec!["url".to_string(), "token".to_string()],
                configuration_notes: "URL is missing".to_string(),
                output: "JSON statistics".to_string(),
                analogy: "A courier".to_string(),
            },
        ],
        errors: vec![missing_url, missing_token, timezone],
    }
}

/// A Gemini-style payload as the analyzer emits it, wrapped in a code fence.
#[allow(dead_code)]
pub const FENCED_ANALYZER_PAYLOAD: &str = r#"```json
{
  "isValid": false,
  "summary": {
    "accomplishment": "Fetches daily statistics",
    "trigger": "Runs every day",
    "finalOutcome": "Statistics are downloaded",
    "analogy": "Like a newspaper"
  },
  "textFlow": "Schedule -> Fetch stats",
  "nodeBreakdowns": [
    {
      "id": "2",
      "name": "Fetch stats",
      "purpose": "Downloads statistics",
      "inputsRequired": ["url"],
      "configurationNotes": "URL is missing",
      "output": "JSON",
      "analogy": "A courier"
    }
  ],
  "errors": [
    {
      "id": "e1",
      "severity": "critical",
      "description": "Missing URL",
      "impact": "Request fails",
      "recommendation": "Set the URL",
      "nodeId": "2",
      "jsonModification": {
        "path": "nodes[1].parameters.url",
        "newValue": "\"https://api.example.com\"",
        "requiresUserInput": false
      }
    },
    {
      "id": "e2",
      "severity": "warning",
      "description": "Retries disabled",
      "impact": "Transient failures stop the run",
      "recommendation": "Enable retries",
      "nodeId": "",
      "jsonModification": {
        "path": "settings.retry",
        "newValue": "{\"enabled\": true, \"count\": 3}",
        "requiresUserInput": false
      }
    },
    {
      "id": "e3",
      "severity": "info",
      "description": "Token placeholder",
      "impact": "Unauthenticated",
      "recommendation": "Add a token",
      "nodeId": "2",
      "jsonModification": {
        "path": "nodes[1].parameters.token",
        "newValue": "YOUR_TOKEN_HERE",
        "requiresUserInput": true
      }
    }
  ]
}
```"#;

/// An analyzer that returns a canned outcome and records what it was sent.
#[allow(dead_code)]
pub struct MockAnalyzer {
    outcome: std::result::Result<AnalysisResult, AnalyzerError>,
    pub received: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockAnalyzer {
    pub fn succeeding(result: AnalysisResult) -> Self {
        Self {
            outcome: Ok(result),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AnalyzerError) -> Self {
        Self {
            outcome: Err(error),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(&self, workflow_json: &str) -> std::result::Result<AnalysisResult, AnalyzerError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(workflow_json.to_string());
        }
        self.outcome.clone()
    }
}

/// A session with a credential present.
#[allow(dead_code)]
pub fn create_ready_session() -> Session {
    Session::new(true)
}
