//! Comments tab and moderation of comments and their replies.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use luxe_client::Envelope;
use luxe_core::{Comment, CommentId, CommentStatus, Reply, ReplyId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::bans::display_date;
use crate::models::{Flash, PageContext};
use crate::routes::dashboard::{Tab, TabLink, tab_links};
use crate::routes::into_page;
use crate::state::AppState;

/// Comments fetched for moderation.
const COMMENTS_PER_PAGE: u32 = 20;

const COMMENTS_FAILED: &str = "خطا در دریافت کامنت‌ها";
const TAB_PATH: &str = "/?tab=comments";

/// Success and failure toasts for a moderation action.
struct Outcome {
    done: &'static str,
    failed: &'static str,
}

const fn comment_status_outcome(status: CommentStatus) -> Outcome {
    match status {
        CommentStatus::Approved => Outcome {
            done: "کامنت تایید شد",
            failed: "خطا در تایید کامنت",
        },
        CommentStatus::Rejected => Outcome {
            done: "کامنت رد شد",
            failed: "خطا در رد کامنت",
        },
        CommentStatus::Pending => Outcome {
            done: "کامنت در انتظار بررسی قرار گرفت",
            failed: "خطا در تغییر وضعیت کامنت",
        },
    }
}

const fn reply_status_outcome(status: CommentStatus) -> Outcome {
    match status {
        CommentStatus::Approved => Outcome {
            done: "پاسخ تایید شد",
            failed: "خطا در تایید پاسخ",
        },
        CommentStatus::Rejected => Outcome {
            done: "پاسخ رد شد",
            failed: "خطا در رد پاسخ",
        },
        CommentStatus::Pending => Outcome {
            done: "پاسخ در انتظار بررسی قرار گرفت",
            failed: "خطا در تغییر وضعیت پاسخ",
        },
    }
}

const COMMENT_DELETE: Outcome = Outcome {
    done: "کامنت حذف شد",
    failed: "خطا در حذف کامنت",
};

const REPLY_DELETE: Outcome = Outcome {
    done: "پاسخ حذف شد",
    failed: "خطا در حذف پاسخ",
};

/// Moderation state shared by comments and replies.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub key: String,
    pub label: &'static str,
    pub can_approve: bool,
    pub can_reject: bool,
}

impl From<CommentStatus> for StatusView {
    fn from(status: CommentStatus) -> Self {
        Self {
            key: status.to_string(),
            label: status.label(),
            can_approve: status != CommentStatus::Approved,
            can_reject: status != CommentStatus::Rejected,
        }
    }
}

/// A reply in the moderation list.
#[derive(Debug, Clone)]
pub struct ReplyView {
    pub id: String,
    pub author: String,
    pub content: String,
    pub date: String,
    pub status: StatusView,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            id: reply.id.to_string(),
            author: reply.author_name(),
            content: reply.content.clone(),
            date: display_date(reply.created_at),
            status: reply.status.into(),
        }
    }
}

/// A comment in the moderation list, with every reply regardless of status.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub product: String,
    pub content: String,
    pub stars: String,
    pub date: String,
    pub status: StatusView,
    pub replies: Vec<ReplyView>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author: comment.author_name(),
            product: comment.product_name().to_owned(),
            content: comment.content.clone(),
            stars: stars(comment.rating),
            date: display_date(comment.created_at),
            status: comment.status.into(),
            replies: comment.replies.iter().map(ReplyView::from).collect(),
        }
    }
}

/// Five-star rating line, filled up to `rating`.
fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Comments tab template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/comments.html")]
pub struct CommentsTabTemplate {
    pub page: PageContext,
    pub tabs: Vec<TabLink>,
    pub comments: Vec<CommentView>,
    pub pending: usize,
}

/// Build the comments tab.
pub(crate) async fn tab(state: &AppState, admin: &AdminSession) -> Result<CommentsTabTemplate> {
    let mut page = PageContext::load(admin).await?;

    let comments = into_page(
        admin
            .api(state.api())
            .list_comments(Some(1), Some(COMMENTS_PER_PAGE))
            .await,
    )
    .map(|l| l.items)
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch comments");
        page.push(Flash::error(e.user_message_or(COMMENTS_FAILED)));
        Vec::new()
    });

    Ok(CommentsTabTemplate {
        page,
        tabs: tab_links(Tab::Comments),
        pending: comments
            .iter()
            .filter(|c| c.status == CommentStatus::Pending)
            .count(),
        comments: comments.iter().map(CommentView::from).collect(),
    })
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: CommentStatus,
}

/// Flash the outcome of a moderation call and go back to the tab.
async fn finish(
    admin: &AdminSession,
    result: std::result::Result<luxe_client::Ack, luxe_client::ApiError>,
    outcome: &Outcome,
) -> Result<Redirect> {
    match result.and_then(Envelope::ensure_success) {
        Ok(_) => {
            tracing::info!(action = outcome.done, "Moderation applied");
            admin.flash(Flash::success(outcome.done)).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Moderation failed");
            admin
                .flash(Flash::error(e.user_message_or(outcome.failed)))
                .await?;
        }
    }
    Ok(Redirect::to(TAB_PATH))
}

/// Approve or reject a comment.
#[instrument(skip(state, admin))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let result = admin
        .api(state.api())
        .update_comment_status(&CommentId::new(id), form.status)
        .await;
    finish(&admin, result, &comment_status_outcome(form.status)).await
}

/// Delete a comment with its replies.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let result = admin
        .api(state.api())
        .delete_comment(&CommentId::new(id))
        .await;
    finish(&admin, result, &COMMENT_DELETE).await
}

/// Approve or reject one reply.
#[instrument(skip(state, admin))]
pub async fn set_reply_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, reply_id)): Path<(String, String)>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let result = admin
        .api(state.api())
        .update_reply_status(&CommentId::new(id), &ReplyId::new(reply_id), form.status)
        .await;
    finish(&admin, result, &reply_status_outcome(form.status)).await
}

/// Delete one reply.
#[instrument(skip(state, admin))]
pub async fn delete_reply(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, reply_id)): Path<(String, String)>,
) -> Result<Redirect> {
    let result = admin
        .api(state.api())
        .delete_reply(&CommentId::new(id), &ReplyId::new(reply_id))
        .await;
    finish(&admin, result, &REPLY_DELETE).await
}
