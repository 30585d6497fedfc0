use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Session start time, used as the filename prefix of every photo in the session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionTimestamp(String);

impl SessionTimestamp {
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Accepts only the `YYYY-MM-DD-HH-MM-SS` form
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .ok()
            .map(|_| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One photo written during a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureArtifact {
    pub timestamp: SessionTimestamp,
    /// 1-based position within the session
    pub index: u32,
    pub path: PathBuf,
}

impl CaptureArtifact {
    pub fn new(timestamp: SessionTimestamp, index: u32, path: PathBuf) -> Self {
        Self {
            timestamp,
            index,
            path,
        }
    }

    pub fn file_name(timestamp: &SessionTimestamp, index: u32) -> String {
        format!("{}-0{}.jpg", timestamp, index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Completed,
    /// Camera, display or pose images could not be acquired; nothing was captured
    Aborted,
    /// A photo failed twice in a row
    Failed,
}

/// Outcome of one session. Artifacts are only published for `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub timestamp: SessionTimestamp,
    pub status: SessionStatus,
    pub artifacts: Vec<CaptureArtifact>,
}

impl SessionResult {
    pub fn completed(timestamp: SessionTimestamp, artifacts: Vec<CaptureArtifact>) -> Self {
        Self {
            timestamp,
            status: SessionStatus::Completed,
            artifacts,
        }
    }

    pub fn aborted(timestamp: SessionTimestamp) -> Self {
        Self {
            timestamp,
            status: SessionStatus::Aborted,
            artifacts: Vec::new(),
        }
    }

    pub fn failed(timestamp: SessionTimestamp) -> Self {
        Self {
            timestamp,
            status: SessionStatus::Failed,
            artifacts: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timestamp_format() {
        let datetime = Utc.with_ymd_and_hms(2024, 10, 14, 18, 30, 5).unwrap();
        let timestamp = SessionTimestamp::from_datetime(&datetime);

        assert_eq!(timestamp.as_str(), "2024-10-14-18-30-05");
        assert_eq!(
            CaptureArtifact::file_name(&timestamp, 2),
            "2024-10-14-18-30-05-02.jpg"
        );
    }

    #[test]
    fn test_timestamp_parse() {
        assert!(SessionTimestamp::parse("2024-10-14-18-30-05").is_some());
        assert!(SessionTimestamp::parse("2024-10-14 18:30:05").is_none());
        assert!(SessionTimestamp::parse("../etc").is_none());
    }

    #[test]
    fn test_only_completed_results_carry_artifacts() {
        let timestamp = SessionTimestamp::parse("2024-10-14-18-30-05").unwrap();

        assert!(!SessionResult::failed(timestamp.clone()).is_complete());
        assert!(SessionResult::aborted(timestamp.clone()).artifacts.is_empty());
        assert!(SessionResult::completed(timestamp, Vec::new()).is_complete());
    }
}
