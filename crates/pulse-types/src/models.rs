use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile identifier. Sample profiles use integers, imported ones use strings,
/// so both are accepted and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProfileId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for ProfileId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ProfileId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl FromStr for ProfileId {
    type Err = std::convert::Infallible;

    /// Numeric strings become `Int`, anything else stays `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(id) => Self::Int(id),
            Err(_) => Self::Text(s.to_string()),
        })
    }
}

/// Decision taken on a discovery card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pass,
    Favorite,
    Connect,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Favorite => "favorite",
            Self::Connect => "connect",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Self::Pass),
            "favorite" => Ok(Self::Favorite),
            "connect" => Ok(Self::Connect),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// One logged swipe decision. Never mutated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub profile_id: ProfileId,
    /// Display name at the time of the action, not re-fetched later.
    pub profile_name: String,
    pub action: ActionKind,
    pub photo_index: u32,
    pub timestamp: DateTime<Utc>,
}

/// Answer to a true/false pulse check question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseAnswer {
    pub value: bool,
    /// Result tag shown after the answer is revealed (e.g. "match", "miss").
    pub result: String,
    pub revealed: bool,
}

/// Light/dark preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown color mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Match,
}

/// A notification currently on screen. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    /// Milliseconds until auto-dismiss.
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
}
