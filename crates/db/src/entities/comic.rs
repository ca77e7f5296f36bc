//! Comic record.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use comicshelf_common::AppError;
use serde::{Deserialize, Serialize};

/// Moderation status of a comic.
///
/// Records written before moderation existed carry no status and are
/// treated as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComicStatus {
    #[default]
    Published,
    Pending,
    Rejected,
}

impl ComicStatus {
    /// Stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for ComicStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            other => Err(AppError::BadRequest(format!("Unknown comic status: {other}"))),
        }
    }
}

/// A comic: ordered pages plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Inline-encoded page images, in reading order.
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Submitting user. Absent for comics added by an administrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default)]
    pub status: ComicStatus,
}

impl Comic {
    /// Whether the comic is visible in the public gallery.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ComicStatus::Published
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_comic_loads_as_published() {
        let comic: Comic = serde_json::from_str(
            r#"{"id":"1700000000000","title":"Old strip","description":"",
                "images":["data:image/png;base64,AAAA"],"createdAt":"2023-11-14T22:13:20.000Z"}"#,
        )
        .unwrap();

        assert_eq!(comic.status, ComicStatus::Published);
        assert!(comic.author_id.is_none());
        assert!(comic.is_published());
    }

    #[test]
    fn test_author_id_is_camel_case() {
        let comic = Comic {
            id: "c1".to_string(),
            title: "Night shift".to_string(),
            description: "Pages".to_string(),
            images: vec!["p1".to_string()],
            created_at: Utc::now(),
            author_id: Some("u1".to_string()),
            status: ComicStatus::Pending,
        };

        let json = serde_json::to_value(&comic).unwrap();
        assert_eq!(json["authorId"], "u1");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("rejected".parse::<ComicStatus>().unwrap(), ComicStatus::Rejected);
        assert!("archived".parse::<ComicStatus>().is_err());
    }
}
