use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of interaction an [`Action`] records.
///
/// Serialized as a bare lowercase string (`"click"`, `"input"`). Unknown strings
/// round-trip through [`ActionKind::Other`] so logs produced by newer recorders
/// still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Click,
    Input,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Input => "input",
            ActionKind::Other(kind) => kind,
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "click" => ActionKind::Click,
            "input" => ActionKind::Input,
            _ => ActionKind::Other(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded user-intent entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    pub selector: String,
    /// Visible text of a clicked element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Field value of an input edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Action {
    pub fn click(selector: impl Into<String>, text: Option<String>) -> Self {
        Self {
            kind: ActionKind::Click,
            selector: selector.into(),
            text,
            value: None,
        }
    }

    pub fn input(selector: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Input,
            selector: selector.into(),
            text: None,
            value: Some(value.into()),
        }
    }

    pub fn is_click(&self) -> bool {
        self.kind == ActionKind::Click
    }

    pub fn is_input(&self) -> bool {
        self.kind == ActionKind::Input
    }
}

/// Ordered, index-addressable sequence of recorded actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action and returns the index it was stored at.
    pub fn push(&mut self, action: Action) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<Action> {
        if index < self.actions.len() {
            Some(self.actions.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    /// The last `n` entries (fewer if the log is shorter).
    pub fn recent(&self, n: usize) -> &[Action] {
        let start = self.actions.len().saturating_sub(n);
        &self.actions[start..]
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl From<Vec<Action>> for ActionLog {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

impl<'a> IntoIterator for &'a ActionLog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
