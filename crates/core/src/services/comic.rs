//! Comic content service.

use std::collections::HashMap;

use chrono::Utc;
use comicshelf_common::{AppError, AppResult, IdGenerator};
use comicshelf_db::entities::{Comic, ComicStatus, SessionUser};
use comicshelf_db::repositories::ComicRepository;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

/// Most pages a single comic may hold.
pub const MAX_COMIC_PAGES: usize = 10;

/// Number of authors in the default leaderboard.
pub const DEFAULT_TOP_AUTHORS: usize = 5;

/// Comic service: gallery queries, submission and moderation.
#[derive(Clone)]
pub struct ContentService {
    comic_repo: ComicRepository,
    id_gen: IdGenerator,
}

/// Input for creating a comic.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComicInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[validate(length(min = 1, max = 10))]
    pub images: Vec<String>,
}

/// Partial update of a comic. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComicInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<ComicStatus>,
}

/// Administrator verdict on a submitted comic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationDecision {
    Publish,
    Reject,
}

impl From<ModerationDecision> for ComicStatus {
    fn from(decision: ModerationDecision) -> Self {
        match decision {
            ModerationDecision::Publish => Self::Published,
            ModerationDecision::Reject => Self::Rejected,
        }
    }
}

/// Published-comic count for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCount {
    pub author_id: String,
    pub count: usize,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub const fn new(comic_repo: ComicRepository) -> Self {
        Self {
            comic_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published comics, for the public gallery.
    pub async fn list(&self) -> Vec<Comic> {
        self.with_status(ComicStatus::Published).await
    }

    /// Every comic regardless of status.
    pub async fn all_comics(&self) -> Vec<Comic> {
        self.comic_repo.find_all().await
    }

    /// Comics awaiting moderation.
    pub async fn pending(&self) -> Vec<Comic> {
        self.with_status(ComicStatus::Pending).await
    }

    async fn with_status(&self, status: ComicStatus) -> Vec<Comic> {
        self.comic_repo
            .find_all()
            .await
            .into_iter()
            .filter(|c| c.status == status)
            .collect()
    }

    /// Get a comic by ID.
    pub async fn get(&self, id: &str) -> Option<Comic> {
        self.comic_repo.find_by_id(id).await
    }

    /// Every comic submitted by `author_id`, in any status.
    pub async fn by_author(&self, author_id: &str) -> Vec<Comic> {
        self.comic_repo
            .find_all()
            .await
            .into_iter()
            .filter(|c| c.author_id.as_deref() == Some(author_id))
            .collect()
    }

    /// Create a comic. Comics without an author are published immediately;
    /// comics with one wait for moderation.
    pub async fn create(
        &self,
        input: CreateComicInput,
        author_id: Option<String>,
    ) -> AppResult<Comic> {
        input.validate()?;
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title: must not be blank".to_string()));
        }

        let status = if author_id.is_some() {
            ComicStatus::Pending
        } else {
            ComicStatus::Published
        };

        let comic = Comic {
            id: self.id_gen.generate(),
            title: input.title,
            description: input.description,
            images: input.images,
            created_at: Utc::now(),
            author_id,
            status,
        };

        let mut comics = self.comic_repo.find_all().await;
        comics.push(comic.clone());
        self.comic_repo.save_all(&comics).await;

        info!(comic_id = %comic.id, status = comic.status.as_str(), "Created comic");
        Ok(comic)
    }

    /// Create a comic on behalf of `user`. Administrators publish directly.
    pub async fn create_as(&self, user: &SessionUser, input: CreateComicInput) -> AppResult<Comic> {
        let author_id = if user.is_admin() {
            None
        } else {
            Some(user.id.clone())
        };
        self.create(input, author_id).await
    }

    /// Merge `input` into the stored comic. Status is only changed when
    /// `input.status` is set.
    pub async fn update(&self, id: &str, input: UpdateComicInput) -> Option<Comic> {
        let mut comics = self.comic_repo.find_all().await;
        let comic = comics.iter_mut().find(|c| c.id == id)?;

        if let Some(title) = input.title {
            comic.title = title;
        }
        if let Some(description) = input.description {
            comic.description = description;
        }
        if let Some(images) = input.images {
            comic.images = images;
        }
        if let Some(status) = input.status {
            comic.status = status;
        }

        let updated = comic.clone();
        self.comic_repo.save_all(&comics).await;
        Some(updated)
    }

    /// Apply a moderation decision. Any status may be overwritten.
    pub async fn moderate(&self, id: &str, decision: ModerationDecision) -> Option<Comic> {
        let status = ComicStatus::from(decision);
        let comic = self
            .update(
                id,
                UpdateComicInput {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await?;

        info!(comic_id = %id, status = status.as_str(), "Moderated comic");
        Some(comic)
    }

    /// Delete a comic. Returns `false` if it did not exist.
    pub async fn delete(&self, id: &str) -> bool {
        let mut comics = self.comic_repo.find_all().await;
        let before = comics.len();
        comics.retain(|c| c.id != id);
        if comics.len() == before {
            return false;
        }

        self.comic_repo.save_all(&comics).await;
        info!(comic_id = %id, "Deleted comic");
        true
    }

    /// Authors ranked by published comic count, highest first. Ties keep
    /// the order in which the authors first appear in the collection.
    pub async fn top_authors(&self, limit: usize) -> Vec<AuthorCount> {
        let mut counts: Vec<AuthorCount> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for comic in self.list().await {
            let Some(author_id) = comic.author_id else {
                continue;
            };
            if let Some(&i) = index.get(&author_id) {
                counts[i].count += 1;
            } else {
                index.insert(author_id.clone(), counts.len());
                counts.push(AuthorCount {
                    author_id,
                    count: 1,
                });
            }
        }

        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(limit);
        counts
    }
}
