use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Review state of a submitted homework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Reviewing,
    Approved,
    Rejected,
}

impl HomeworkStatus {
    /// Static verdict text shown to the user for this status.
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review by a reviewer.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has remarks.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "approved" => Ok(HomeworkStatus::Approved),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(AppError::UnknownStatus(other.to_string())),
        }
    }
}

/// A homework record as returned by the review API.
///
/// `status` is kept as a raw string so an unexpected value surfaces as
/// `AppError::UnknownStatus` instead of failing the whole body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Homework {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: String,
    pub homework_name: String,
    #[serde(default)]
    pub reviewer_comment: Option<String>,
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
}

/// Body of a successful `homework_statuses` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeworkStatusesResponse {
    pub homeworks: Vec<Homework>,
    /// Server time to use as the next `from_date` cursor.
    #[serde(default)]
    pub current_date: Option<i64>,
}

/// The interesting part of the newest homework record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: HomeworkStatus,
    pub homework_name: String,
    pub reviewer_comment: Option<String>,
}

impl TryFrom<&Homework> for StatusUpdate {
    type Error = AppError;

    fn try_from(homework: &Homework) -> Result<Self, Self::Error> {
        Ok(Self {
            status: homework.status.parse()?,
            homework_name: homework.homework_name.clone(),
            reviewer_comment: homework
                .reviewer_comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// Result of a single poll against the review API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The newest homework record.
    Update {
        update: StatusUpdate,
        current_date: Option<i64>,
    },
    /// No homework records changed since the requested timestamp.
    NoChange { current_date: Option<i64> },
}

impl FetchOutcome {
    pub fn current_date(&self) -> Option<i64> {
        match self {
            FetchOutcome::Update { current_date, .. } => *current_date,
            FetchOutcome::NoChange { current_date } => *current_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_display() {
        for status in [
            HomeworkStatus::Reviewing,
            HomeworkStatus::Approved,
            HomeworkStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<HomeworkStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "lost".parse::<HomeworkStatus>().unwrap_err();
        assert!(matches!(err, AppError::UnknownStatus(s) if s == "lost"));
    }

    #[test]
    fn test_verdicts_are_distinct() {
        let approved = HomeworkStatus::Approved.verdict();
        let reviewing = HomeworkStatus::Reviewing.verdict();
        let rejected = HomeworkStatus::Rejected.verdict();
        assert_ne!(approved, reviewing);
        assert_ne!(approved, rejected);
        assert_ne!(reviewing, rejected);
    }

    #[test]
    fn test_deserialize_response() {
        let body = r#"{
            "homeworks": [{
                "id": 124,
                "status": "rejected",
                "homework_name": "username__hw_python_oop.zip",
                "reviewer_comment": "Code is fine, but tests are missing",
                "date_updated": "2020-02-13T16:42:47Z",
                "lesson_name": "Final project"
            }],
            "current_date": 1581604970
        }"#;

        let response: HomeworkStatusesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.current_date, Some(1581604970));
        assert_eq!(response.homeworks.len(), 1);

        let update = StatusUpdate::try_from(&response.homeworks[0]).unwrap();
        assert_eq!(update.status, HomeworkStatus::Rejected);
        assert_eq!(update.homework_name, "username__hw_python_oop.zip");
        assert_eq!(
            update.reviewer_comment.as_deref(),
            Some("Code is fine, but tests are missing")
        );
    }

    #[test]
    fn test_blank_comment_dropped() {
        let homework = Homework {
            id: None,
            status: "approved".into(),
            homework_name: "hw.zip".into(),
            reviewer_comment: Some("   ".into()),
            date_updated: None,
        };
        let update = StatusUpdate::try_from(&homework).unwrap();
        assert_eq!(update.reviewer_comment, None);
    }

    #[test]
    fn test_missing_homeworks_key_fails() {
        let result = serde_json::from_str::<HomeworkStatusesResponse>(r#"{"current_date": 1}"#);
        assert!(result.is_err());
    }
}
