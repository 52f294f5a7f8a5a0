use serde_json::{Value, json};

/// Instructions sent with every analysis request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert reviewer of automation workflows \
(n8n, Zapier, Make and similar tools). You receive a workflow as JSON. \
Explain what it does in plain language for a non-technical reader, walk through every \
node in execution order, and detect configuration problems: missing credentials, \
broken connections, invalid expressions, unreachable nodes, deprecated parameters and \
insecure settings. For every problem propose exactly one fix as a modification of the \
original JSON: `path` is a dot/bracket locator into the submitted document (for example \
`nodes[2].parameters.url`) and `newValue` is the replacement serialized as a JSON string. \
When the fix needs a secret or any other value only the user can supply, put a clear \
placeholder in `newValue` and set `requiresUserInput` to true. Use an empty string for \
`nodeId` when an issue concerns the whole workflow. Respond with JSON only.";

/// The fixed response schema the analyzer must follow.
pub fn response_schema() -> Value {
    let text = json!({ "type": "STRING" });
    json!({
        "type": "OBJECT",
        "properties": {
            "isValid": { "type": "BOOLEAN" },
            "summary": {
                "type": "OBJECT",
                "properties": {
                    "accomplishment": text,
                    "trigger": text,
                    "finalOutcome": text,
                    "analogy": text
                },
                "required": ["accomplishment", "trigger", "finalOutcome", "analogy"]
            },
            "textFlow": text,
            "nodeBreakdowns": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": text,
                        "name": text,
                        "purpose": text,
                        "inputsRequired": { "type": "ARRAY", "items": text },
                        "configurationNotes": text,
                        "output": text,
                        "analogy": text
                    },
                    "required": [
                        "id", "name", "purpose", "inputsRequired",
                        "configurationNotes", "output", "analogy"
                    ]
                }
            },
            "errors": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": text,
                        "severity": { "type": "STRING", "enum": ["critical", "warning", "info"] },
                        "description": text,
                        "impact": text,
                        "recommendation": text,
                        "nodeId": text,
                        "jsonModification": {
                            "type": "OBJECT",
                            "properties": {
                                "path": text,
                                "newValue": text,
                                "requiresUserInput": { "type": "BOOLEAN" }
                            },
                            "required": ["path", "newValue", "requiresUserInput"]
                        }
                    },
                    "required": [
                        "id", "severity", "description", "impact",
                        "recommendation", "jsonModification"
                    ]
                }
            }
        },
        "required": ["isValid", "summary", "textFlow", "nodeBreakdowns", "errors"]
    })
}
