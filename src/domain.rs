use std::str::FromStr;

use compact_str::{CompactString, format_compact};
use serde::Deserialize;
use serde_json::Value;

use crate::client::{
    error::{ClientError, Result},
    response::kind,
};

/// One homework entry as reported by the review API
///
/// Fields are optional at the wire level so that a single odd record does not
/// break the whole response; the formatter reports what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HomeworkRecord {
    pub homework_name: Option<CompactString>,
    pub status: Option<CompactString>,
}

/// Review status catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Localized verdict shown to the user
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(ClientError::unknown_status(other)),
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HomeworkRecord {
    /// Decode one raw entry of the `homeworks` list
    pub fn from_entry(entry: &Value) -> Result<Self> {
        if !entry.is_object() {
            return Err(ClientError::malformed(format!(
                "homework entries must be objects, got {}",
                kind(entry)
            )));
        }
        Self::deserialize(entry)
            .map_err(|e| ClientError::malformed(format!("invalid homework entry: {e}")))
    }

    #[cfg(test)]
    pub fn new(name: impl Into<CompactString>, status: impl Into<CompactString>) -> Self {
        Self {
            homework_name: Some(name.into()),
            status: Some(status.into()),
        }
    }

    pub fn parsed_status(&self) -> Result<HomeworkStatus> {
        self.status
            .as_deref()
            .ok_or(ClientError::MissingField("status"))?
            .parse()
    }
}

/// Render the notification text for a status change
pub fn format_message(record: &HomeworkRecord) -> Result<CompactString> {
    let name = record
        .homework_name
        .as_deref()
        .ok_or(ClientError::MissingField("homework_name"))?;
    let status = record.parsed_status()?;

    Ok(format_compact!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        status.verdict()
    ))
}
