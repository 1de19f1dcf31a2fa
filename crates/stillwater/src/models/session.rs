use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wellness session: the published (or draft) unit of content.
///
/// Tags live in [`super::session_tag`]; a [`SessionRecord`] pairs the row
/// with its tags in order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Creating user; never changes.
    pub owner_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub save_file_url: Option<String>,

    pub status: Status,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Published => "published",
        }
    }

    pub fn parse(raw: &str) -> Option<Status> {
        match raw {
            "draft" => Some(Status::Draft),
            "published" => Some(Status::Published),
            _ => None,
        }
    }
}

impl Model {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }
}

/// Current UTC time truncated to microseconds, the finest precision every
/// supported store keeps.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Timestamp for a mutation of a record last touched at `previous`.
/// Always strictly later than `previous`, even if the clock has not moved.
pub fn next_updated_at(previous: NaiveDateTime) -> NaiveDateTime {
    let now = now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// A session row together with its ordered tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session: Model,
    pub tags: Vec<String>,
}

/// Public identity of an owner, the only owner data non-owners see.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PublicOwner {
    pub email: String,
}

/// The JSON representation of a session returned to clients.
///
/// Owners get `ownerId`; everyone else gets only `owner.email`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<PublicOwner>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub save_file_url: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionResponse {
    /// Unredacted view for the owner.
    pub fn owned(record: SessionRecord) -> Self {
        let owner_id = record.session.owner_id.clone();
        let mut response = Self::build(record);
        response.owner_id = Some(owner_id);
        response
    }

    /// Redacted view for anyone but the owner.
    pub fn public(record: SessionRecord, owner_email: Option<String>) -> Self {
        let mut response = Self::build(record);
        response.owner = owner_email.map(|email| PublicOwner { email });
        response
    }

    fn build(record: SessionRecord) -> Self {
        let SessionRecord { session, tags } = record;
        SessionResponse {
            id: session.id,
            owner_id: None,
            owner: None,
            title: session.title,
            content: session.content,
            tags,
            save_file_url: session.save_file_url,
            status: session.status,
            created_at: session.created_at.and_utc(),
            updated_at: session.updated_at.and_utc(),
        }
    }
}

/// Slim view used by the stats endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for SessionSummary {
    fn from(m: Model) -> Self {
        SessionSummary {
            id: m.id,
            title: m.title,
            status: m.status,
            updated_at: m.updated_at.and_utc(),
        }
    }
}

/// Confirmation payload of a delete.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedSession {
    pub id: String,
    pub title: String,
    pub status: Status,
}
