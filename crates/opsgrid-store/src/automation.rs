#![forbid(unsafe_code)]

//! Automation presets.
//!
//! A preset is a named sequence of actions run as one batch. The only
//! action kind today is `open`, which launches a path the same way a link
//! does. Presets are built up action by action; an action with an empty
//! path is rejected, and a missing label falls back to the path's final
//! segment.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::json::{JsonFileStore, StoreError};

const AUTOMATION_FILE: &str = "automation.json";

/// What an action does with its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    #[default]
    Open,
}

/// One step in a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    pub path: String,
    pub label: String,
}

impl Action {
    /// Build an `open` action, deriving the label from the path when none
    /// is given. Rejects an empty path.
    pub fn open(path: impl Into<String>, label: Option<String>) -> Result<Self, ActionError> {
        let path = path.into();
        if path.is_empty() {
            return Err(ActionError::EmptyPath);
        }
        let label = match label.filter(|l| !l.is_empty()) {
            Some(label) => label,
            None => final_segment(&path).to_owned(),
        };
        Ok(Self {
            kind: ActionKind::Open,
            path,
            label,
        })
    }
}

/// Last path segment, splitting on both separator styles.
fn final_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// A named batch of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl AutomationPreset {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            actions: Vec::new(),
        }
    }
}

/// Rejected action input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// Every action needs a path to open.
    EmptyPath,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "action path must not be empty"),
        }
    }
}

impl std::error::Error for ActionError {}

/// CRUD over `automation.json`.
#[derive(Debug, Clone)]
pub struct AutomationStore {
    files: JsonFileStore,
}

impl AutomationStore {
    #[must_use]
    pub fn new(files: JsonFileStore) -> Self {
        Self { files }
    }

    pub fn load(&self) -> Result<Vec<AutomationPreset>, StoreError> {
        self.files.load(AUTOMATION_FILE)
    }

    pub fn save(&self, presets: &[AutomationPreset]) -> Result<(), StoreError> {
        self.files.save(AUTOMATION_FILE, presets)
    }

    /// Insert or replace a preset by id, then persist.
    pub fn upsert(&self, preset: AutomationPreset) -> Result<Vec<AutomationPreset>, StoreError> {
        let mut presets = self.load()?;
        match presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => presets.push(preset),
        }
        self.save(&presets)?;
        Ok(presets)
    }

    /// Remove a preset by id and persist.
    pub fn remove(&self, id: &str) -> Result<Vec<AutomationPreset>, StoreError> {
        let mut presets = self.load()?;
        presets.retain(|p| p.id != id);
        self.save(&presets)?;
        Ok(presets)
    }
}
