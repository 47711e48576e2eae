use std::path::Path;

use serde_json::{json, Value};
use tracing::debug;

/// One mutation applied to the environment, tagged for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    ActivationUpdated,
    ScriptUpdated,
    ArtifactRemoved,
    LinkUpdated,
}

impl ActionKind {
    #[must_use]
    pub fn tag(self) -> char {
        match self {
            ActionKind::ActivationUpdated => 'A',
            ActionKind::ScriptUpdated => 'S',
            ActionKind::ArtifactRemoved => 'D',
            ActionKind::LinkUpdated => 'L',
        }
    }
}

#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    pub path: String,
}

/// Ordered record of every mutation performed during one invocation.
#[derive(Debug, Default)]
pub struct Report {
    actions: Vec<Action>,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: ActionKind, path: &Path) {
        let path = path.display().to_string();
        debug!(tag = %kind.tag(), %path, "recorded mutation");
        self.actions.push(Action { kind, path });
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    #[must_use]
    pub fn to_details(&self) -> Value {
        let actions: Vec<Value> = self
            .actions
            .iter()
            .map(|action| {
                json!({
                    "tag": action.kind.tag().to_string(),
                    "path": action.path,
                })
            })
            .collect();
        json!({
            "actions": actions,
            "mutations": self.actions.len(),
        })
    }
}
