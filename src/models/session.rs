use serde::{Deserialize, Serialize};

/// The kind of live session a coordinator is measuring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    Manual,
    Pomodoro,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Manual => "manual",
            SessionMode::Pomodoro => "pomodoro",
        }
    }
}

/// Delivered to mode-switch subscribers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeSwitch {
    pub from: SessionMode,
    pub to: SessionMode,
    /// Seconds of the outgoing session credited to manual time.
    pub carried_seconds: u64,
}
