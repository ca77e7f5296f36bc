//! Command dispatch.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use comicshelf_common::{AppError, AppResult, Config, SharedKv};
use comicshelf_core::access::{can_modify_comic, require_admin, require_user};
use comicshelf_core::{
    AuthService, ContentService, CreateComicInput, MAX_COMIC_PAGES, RegisterInput, ReviewBoard,
    ReviewInput, Session, StatisticsService, TicketDesk, TicketFilter, TicketInput,
    UpdateComicInput, UserDirectory, VisitorCounter,
};
use comicshelf_db::repositories::{
    ComicRepository, ReviewRepository, TicketRepository, UserRepository, VisitorRepository,
};
use serde_json::{Value, json};
use tracing::info;

use crate::{Command, ComicsCommand, ReviewsCommand, TicketsCommand};

/// Services wired over one store.
pub struct App {
    auth: AuthService,
    content: ContentService,
    desk: TicketDesk,
    reviews: ReviewBoard,
    visitors: VisitorCounter,
    statistics: StatisticsService,
}

impl App {
    #[must_use]
    pub fn new(store: SharedKv, config: &Config) -> Self {
        let directory =
            UserDirectory::new(UserRepository::new(store.clone()), config.admin.clone());
        let content = ContentService::new(ComicRepository::new(store.clone()));
        let desk = TicketDesk::new(TicketRepository::new(store.clone()));
        let visitors = VisitorCounter::new(VisitorRepository::new(
            store.clone(),
            &config.site.hostname,
        ));

        Self {
            auth: AuthService::new(directory),
            statistics: StatisticsService::new(content.clone(), desk.clone(), visitors.clone()),
            reviews: ReviewBoard::new(ReviewRepository::new(store)),
            content,
            desk,
            visitors,
        }
    }

    pub async fn execute(&self, session: &mut Session, command: Command) -> AppResult<Value> {
        match command {
            Command::Login {
                identifier,
                password,
            } => to_json(&self.auth.login(session, &identifier, &password).await?),
            Command::Logout => {
                self.auth.logout(session);
                Ok(json!({ "signedIn": false }))
            }
            Command::Whoami => to_json(&session.current()),
            Command::Register {
                username,
                email,
                password,
            } => {
                let input = RegisterInput {
                    username,
                    email,
                    password,
                };
                to_json(&self.auth.register(session, input).await?)
            }
            Command::Comics(cmd) => self.comics(session, cmd).await,
            Command::Tickets(cmd) => self.tickets(session, cmd).await,
            Command::Reviews(cmd) => self.reviews(session, cmd).await,
            Command::Stats => {
                require_admin(session)?;
                to_json(&self.statistics.overview().await)
            }
            Command::Visit => Ok(json!({ "visits": self.visitors.record_visit().await })),
        }
    }

    async fn comics(&self, session: &Session, cmd: ComicsCommand) -> AppResult<Value> {
        match cmd {
            ComicsCommand::List => to_json(&self.content.list().await),
            ComicsCommand::All => {
                require_admin(session)?;
                to_json(&self.content.all_comics().await)
            }
            ComicsCommand::Pending => {
                require_admin(session)?;
                to_json(&self.content.pending().await)
            }
            ComicsCommand::Mine => {
                let user = require_user(session)?;
                to_json(&self.content.by_author(&user.id).await)
            }
            ComicsCommand::Show { id } => {
                let comic = self
                    .content
                    .get(&id)
                    .await
                    .ok_or_else(|| AppError::ComicNotFound(id.clone()))?;
                // Unpublished comics are visible to their author and admins only.
                if !comic.is_published()
                    && !session.current().is_some_and(|u| can_modify_comic(u, &comic))
                {
                    return Err(AppError::ComicNotFound(id));
                }
                to_json(&comic)
            }
            ComicsCommand::Create {
                title,
                description,
                mut images,
                image_files,
            } => {
                let user = require_user(session)?;
                for path in &image_files {
                    images.push(inline_image(path).await?);
                }
                let input = CreateComicInput {
                    title,
                    description,
                    images,
                };
                to_json(&self.content.create_as(user, input).await?)
            }
            ComicsCommand::Edit {
                id,
                title,
                description,
                mut images,
                image_files,
            } => {
                let user = require_user(session)?;
                let comic = self
                    .content
                    .get(&id)
                    .await
                    .ok_or_else(|| AppError::ComicNotFound(id.clone()))?;
                if !can_modify_comic(user, &comic) {
                    return Err(AppError::Forbidden("not your comic".to_string()));
                }
                if title.as_deref().is_some_and(|t| t.trim().is_empty()) {
                    return Err(AppError::Validation("title: must not be blank".to_string()));
                }
                for path in &image_files {
                    images.push(inline_image(path).await?);
                }
                if images.len() > MAX_COMIC_PAGES {
                    return Err(AppError::Validation(format!(
                        "images: at most {MAX_COMIC_PAGES} pages"
                    )));
                }
                let input = UpdateComicInput {
                    title,
                    description,
                    images: (!images.is_empty()).then_some(images),
                    status: None,
                };
                let comic = self
                    .content
                    .update(&id, input)
                    .await
                    .ok_or(AppError::ComicNotFound(id))?;
                to_json(&comic)
            }
            ComicsCommand::Moderate { id, decision } => {
                require_admin(session)?;
                let comic = self
                    .content
                    .moderate(&id, decision.into())
                    .await
                    .ok_or(AppError::ComicNotFound(id))?;
                to_json(&comic)
            }
            ComicsCommand::Delete { id } => {
                let user = require_user(session)?;
                let comic = self
                    .content
                    .get(&id)
                    .await
                    .ok_or_else(|| AppError::ComicNotFound(id.clone()))?;
                if !can_modify_comic(user, &comic) {
                    return Err(AppError::Forbidden("not your comic".to_string()));
                }
                Ok(json!({ "deleted": self.content.delete(&id).await }))
            }
            ComicsCommand::Top { limit } => to_json(&self.content.top_authors(limit).await),
        }
    }

    async fn tickets(&self, session: &Session, cmd: TicketsCommand) -> AppResult<Value> {
        match cmd {
            TicketsCommand::List {
                status,
                priority,
                query,
            } => {
                require_admin(session)?;
                let filter = TicketFilter {
                    status,
                    priority,
                    query,
                };
                to_json(&self.desk.search(&filter).await)
            }
            TicketsCommand::Mine => {
                let user = require_user(session)?;
                to_json(&self.desk.for_user(&user.id).await)
            }
            TicketsCommand::Show { id } => {
                let user = require_user(session)?;
                let ticket = self
                    .desk
                    .get(&id)
                    .await
                    .filter(|t| user.is_admin() || t.user_id == user.id)
                    .ok_or(AppError::TicketNotFound(id))?;
                to_json(&ticket)
            }
            TicketsCommand::Create {
                subject,
                message,
                category,
                priority,
                name,
                email,
            } => {
                let input = TicketInput {
                    subject,
                    message,
                    category,
                    priority,
                    guest_name: name,
                    guest_email: email,
                };
                to_json(&self.desk.submit(session, input).await?)
            }
            TicketsCommand::Status { id, status } => {
                require_admin(session)?;
                let ticket = self
                    .desk
                    .update_status(&id, status)
                    .await
                    .ok_or(AppError::TicketNotFound(id))?;
                to_json(&ticket)
            }
            TicketsCommand::Respond { id, message } => {
                let user = require_user(session)?;
                let owns = self
                    .desk
                    .get(&id)
                    .await
                    .is_some_and(|t| user.is_admin() || t.user_id == user.id);
                if !owns {
                    return Err(AppError::TicketNotFound(id));
                }
                to_json(&self.desk.respond_as(user, &id, &message).await?)
            }
            TicketsCommand::Delete { id } => {
                require_admin(session)?;
                Ok(json!({ "deleted": self.desk.delete(&id).await }))
            }
            TicketsCommand::Stats => {
                require_admin(session)?;
                to_json(&self.desk.stats().await)
            }
        }
    }

    async fn reviews(&self, session: &Session, cmd: ReviewsCommand) -> AppResult<Value> {
        match cmd {
            ReviewsCommand::Add { rating, comment } => {
                let user = require_user(session)?;
                let review = self
                    .reviews
                    .submit(user, ReviewInput { rating, comment })
                    .await?;
                to_json(&review)
            }
            ReviewsCommand::Recent { limit } => to_json(&self.reviews.recent(limit).await),
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Read an image file into a `data:` URL.
async fn inline_image(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::BadRequest(format!("Cannot read {}: {e}", path.display())))?;
    info!(path = %path.display(), bytes = bytes.len(), "Inlining image");
    Ok(format!(
        "data:{};base64,{}",
        mime_for(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Cli, Decision};
    use clap::{CommandFactory, Parser};
    use comicshelf_db::entities::{TicketCategory, TicketPriority, TicketStatus};
    use comicshelf_db::test_utils::memory_store;

    fn app() -> App {
        App::new(memory_store(), &Config::default())
    }

    async fn admin_session(app: &App) -> Session {
        let mut session = Session::anonymous();
        app.execute(
            &mut session,
            Command::Login {
                identifier: "admin".to_string(),
                password: "admin".to_string(),
            },
        )
        .await
        .unwrap();
        session
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ticket_filters() {
        let cli = Cli::try_parse_from([
            "comicshelf",
            "tickets",
            "list",
            "--status",
            "in-progress",
            "--priority",
            "urgent",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Tickets(TicketsCommand::List {
                status: Some(TicketStatus::InProgress),
                priority: Some(TicketPriority::Urgent),
                query: None,
            })
        ));

        assert!(Cli::try_parse_from(["comicshelf", "tickets", "list", "--status", "done"]).is_err());
    }

    #[tokio::test]
    async fn test_admin_commands_are_gated() {
        let app = app();
        let mut anonymous = Session::anonymous();

        let err = app
            .execute(&mut anonymous, Command::Comics(ComicsCommand::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let mut admin = admin_session(&app).await;
        let stats = app.execute(&mut admin, Command::Stats).await.unwrap();
        assert_eq!(stats["tickets"]["total"], 0);
    }

    #[tokio::test]
    async fn test_submit_and_moderate() {
        let app = app();
        let mut reader = Session::anonymous();
        app.execute(
            &mut reader,
            Command::Register {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();

        let created = app
            .execute(
                &mut reader,
                Command::Comics(ComicsCommand::Create {
                    title: "Harbor".to_string(),
                    description: String::new(),
                    images: vec!["data:image/png;base64,AAAA".to_string()],
                    image_files: Vec::new(),
                }),
            )
            .await
            .unwrap();
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_str().unwrap().to_string();

        let mut admin = admin_session(&app).await;
        let moderated = app
            .execute(
                &mut admin,
                Command::Comics(ComicsCommand::Moderate {
                    id: id.clone(),
                    decision: Decision::Publish,
                }),
            )
            .await
            .unwrap();
        assert_eq!(moderated["status"], "published");

        let listed = app
            .execute(&mut reader, Command::Comics(ComicsCommand::List))
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_is_owner_only_and_keeps_status() {
        let app = app();
        let mut alice = Session::anonymous();
        app.execute(
            &mut alice,
            Command::Register {
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();
        let created = app
            .execute(
                &mut alice,
                Command::Comics(ComicsCommand::Create {
                    title: "Harbor".to_string(),
                    description: String::new(),
                    images: vec!["data:image/png;base64,AAAA".to_string()],
                    image_files: Vec::new(),
                }),
            )
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let edit = |title: &str| {
            Command::Comics(ComicsCommand::Edit {
                id: id.clone(),
                title: Some(title.to_string()),
                description: None,
                images: Vec::new(),
                image_files: Vec::new(),
            })
        };

        let edited = app.execute(&mut alice, edit("Harbor Lights")).await.unwrap();
        assert_eq!(edited["title"], "Harbor Lights");
        assert_eq!(edited["status"], "pending");
        assert_eq!(edited["images"].as_array().unwrap().len(), 1);

        let err = app.execute(&mut alice, edit("  ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut bob = Session::anonymous();
        app.execute(
            &mut bob,
            Command::Register {
                username: "bob".to_string(),
                email: "bob@x.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap();
        let err = app.execute(&mut bob, edit("Mine now")).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut admin = admin_session(&app).await;
        let edited = app.execute(&mut admin, edit("Harbor")).await.unwrap();
        assert_eq!(edited["title"], "Harbor");
        assert_eq!(edited["status"], "pending");
    }

    #[tokio::test]
    async fn test_guest_ticket() {
        let app = app();
        let mut anonymous = Session::anonymous();

        let ticket = app
            .execute(
                &mut anonymous,
                Command::Tickets(TicketsCommand::Create {
                    subject: "Billing".to_string(),
                    message: "Charged twice".to_string(),
                    category: TicketCategory::Billing,
                    priority: TicketPriority::High,
                    name: Some("Sam".to_string()),
                    email: Some("sam@x.com".to_string()),
                }),
            )
            .await
            .unwrap();

        assert_eq!(ticket["isGuest"], true);
        assert!(ticket["userId"].as_str().unwrap().starts_with("guest_"));
    }

    #[tokio::test]
    async fn test_inline_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.PNG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let inlined = inline_image(&path).await.unwrap();
        assert_eq!(inlined, "data:image/png;base64,AQID");

        let err = inline_image(&dir.path().join("missing.png")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("a")), "application/octet-stream");
    }
}
