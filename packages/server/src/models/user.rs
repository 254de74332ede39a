use chrono::{DateTime, NaiveDate, Utc};
use common::{ActivityType, ReputeReason, TargetKind, UserStatus};
use serde::{Deserialize, Serialize};

use crate::entity::{activity, repute, user, user_message};
use crate::error::AppError;

/// Public profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserProfileResponse {
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
    pub reputation: i32,
    pub status: UserStatus,
    /// Human-readable status, e.g. "Forum Moderator".
    #[schema(example = "Approved User")]
    pub status_display: String,
    pub is_administrator: bool,
    pub gold: i32,
    pub silver: i32,
    pub bronze: i32,
    /// Hex SHA-256 of the normalized email.
    pub gravatar: String,
    pub real_name: String,
    pub website: String,
    pub location: String,
    pub date_of_birth: Option<NaiveDate>,
    pub about: String,
    pub last_seen: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserProfileResponse {
    fn from(m: user::Model) -> Self {
        Self {
            status_display: m.standing().status_display().to_string(),
            id: m.id,
            username: m.username,
            reputation: m.reputation,
            status: m.status,
            is_administrator: m.is_administrator,
            gold: m.gold,
            silver: m.silver,
            bronze: m.bronze,
            gravatar: m.gravatar,
            real_name: m.real_name,
            website: m.website,
            location: m.location,
            date_of_birth: m.date_of_birth,
            about: m.about,
            last_seen: m.last_seen,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    /// One of `a`, `w`, `s`, `b`, `m`.
    #[schema(example = "s")]
    pub status: UserStatus,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ModerateReputationRequest {
    #[schema(example = -20)]
    pub delta: i32,
    /// Reason recorded in the ledger; required.
    #[schema(example = "Spam cleanup")]
    pub comment: String,
}

pub fn validate_moderate_reputation(req: &ModerateReputationRequest) -> Result<(), AppError> {
    if req.comment.trim().is_empty() || req.comment.chars().count() > 128 {
        return Err(AppError::Validation(
            "Comment must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReputationResponse {
    /// Balance after the change.
    pub reputation: i32,
    /// Change actually applied after the floor of 1.
    pub applied: i32,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    /// Maximum rows (default 50, max 200).
    pub limit: Option<u64>,
}

impl HistoryQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReputeEntry {
    pub id: i32,
    pub question_id: Option<i32>,
    pub positive: i32,
    pub negative: i32,
    pub reason: ReputeReason,
    pub comment: Option<String>,
    pub reputation: i32,
    pub reputed_at: DateTime<Utc>,
}

impl From<repute::Model> for ReputeEntry {
    fn from(m: repute::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            positive: m.positive,
            negative: m.negative,
            reason: m.reason,
            comment: m.comment,
            reputation: m.reputation,
            reputed_at: m.reputed_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationItem {
    pub activity_id: i32,
    pub activity_type: ActivityType,
    #[schema(example = "new answer")]
    pub description: String,
    pub actor_id: i32,
    pub target_kind: TargetKind,
    pub target_id: i32,
    pub question_id: Option<i32>,
    pub active_at: DateTime<Utc>,
}

impl From<activity::Model> for NotificationItem {
    fn from(m: activity::Model) -> Self {
        Self {
            description: m.activity_type.describe().to_string(),
            activity_id: m.id,
            activity_type: m.activity_type,
            actor_id: m.user_id,
            target_kind: m.target_kind,
            target_id: m.target_id,
            question_id: m.question_id,
            active_at: m.active_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NotificationsResponse {
    /// Unseen responses.
    pub response_count: i32,
    pub data: Vec<NotificationItem>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<user_message::Model> for MessageResponse {
    fn from(m: user_message::Model) -> Self {
        Self {
            id: m.id,
            message: m.message,
            created_at: m.created_at,
        }
    }
}
