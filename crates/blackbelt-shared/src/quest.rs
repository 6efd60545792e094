use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuestError;

/// Progress at or above which a quest counts as completed.
pub const COMPLETE_AT: u8 = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    #[default]
    Pending,
    Completed,
}

impl QuestStatus {
    pub fn from_progress(progress: u8) -> Self {
        if progress >= COMPLETE_AT {
            Self::Completed
        } else {
            Self::Pending
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the persisted `tasks` array.
///
/// `status` is stored alongside `progress`. Every mutation goes through
/// [`Quest::set_progress`], and the store re-derives it on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub progress: u8,

    #[serde(default)]
    pub status: QuestStatus,
}

impl Quest {
    pub fn new(name: impl Into<String>, progress: u8) -> Self {
        Self {
            name: name.into(),
            progress,
            status: QuestStatus::from_progress(progress),
        }
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress;
        self.status = QuestStatus::from_progress(progress);
    }

    pub fn is_completed(&self) -> bool {
        self.status == QuestStatus::Completed
    }
}

/// Identity key used for uniqueness checks: trimmed and case-folded.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [Self::All, Self::Pending, Self::Completed];

    pub fn matches(self, quest: &Quest) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !quest.is_completed(),
            Self::Completed => quest.is_completed(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(QuestError::UnknownFilter(other.to_string())),
        }
    }
}
