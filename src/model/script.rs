use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a case script is allowed to see: the captured HTTP response
/// plus the case's own record/parameter data. Scripts may read and mutate
/// these fields and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExecutionContext {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub records: Value,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptStatus {
    Completed,
    Failed,
}

/// Result of one script run: the (possibly mutated) context, the ordered log
/// trail, and the error that stopped the script if one did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptOutcome {
    pub status: ScriptStatus,
    pub context: ExecutionContext,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScriptOutcome {
    pub fn completed(context: ExecutionContext, logs: Vec<String>) -> Self {
        Self {
            status: ScriptStatus::Completed,
            context,
            logs,
            error: None,
        }
    }

    pub fn failed(context: ExecutionContext, logs: Vec<String>, error: String) -> Self {
        Self {
            status: ScriptStatus::Failed,
            context,
            logs,
            error: Some(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ScriptStatus::Completed
    }
}
