use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Func, LikeExpr, Order, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::extractors::PageRequest;
use crate::ids;
use crate::models::session::{self, Entity as Session, Model};
use crate::models::session_tag::{self, Entity as SessionTag};
use crate::models::{SessionRecord, Status};
use crate::validation::SessionInput;

/// Which sessions a query may ever see, before any optional filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Everyone's published sessions.
    Published,
    /// One owner's sessions, any status.
    Owner(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFilter {
    pub scope: Scope,
    pub status: Option<Status>,
    /// Case-insensitive substring over title or content.
    pub search: Option<String>,
    /// Keep sessions carrying at least one of these tags.
    pub tags: Vec<String>,
}

impl SessionFilter {
    pub fn new(scope: Scope) -> Self {
        SessionFilter {
            scope,
            status: None,
            search: None,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    /// Accepts the camelCase API names and their snake_case forms.
    pub fn parse(raw: &str) -> Option<SortField> {
        match raw {
            "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Some(SortField::UpdatedAt),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }

    fn column(&self) -> session::Column {
        match self {
            SortField::CreatedAt => session::Column::CreatedAt,
            SortField::UpdatedAt => session::Column::UpdatedAt,
            SortField::Title => session::Column::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<SortOrder> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn order(&self) -> Order {
        match self {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub const NEWEST_CREATED: Sort = Sort {
        field: SortField::CreatedAt,
        order: SortOrder::Desc,
    };
    pub const NEWEST_UPDATED: Sort = Sort {
        field: SortField::UpdatedAt,
        order: SortOrder::Desc,
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub total: u64,
    pub draft: u64,
    pub published: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize, ToSchema)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

// ── Reads ──

/// Load one session with its tags.
pub async fn find<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<SessionRecord>, DbErr> {
    let Some(model) = Session::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let tags = load_tags(db, std::slice::from_ref(&model.id))
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(Some(SessionRecord {
        session: model,
        tags,
    }))
}

/// Load one session row without its tags.
pub async fn find_model<C: ConnectionTrait>(db: &C, id: &str) -> Result<Option<Model>, DbErr> {
    Session::find_by_id(id.to_string()).one(db).await
}

/// One page of sessions matching `filter`, plus the total match count.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    filter: &SessionFilter,
    sort: Sort,
    page: PageRequest,
) -> Result<(Vec<SessionRecord>, u64), DbErr> {
    let query = Session::find()
        .filter(filter_condition(filter))
        .order_by(sort.field.column(), sort.order.order())
        .order_by(session::Column::Id, sort.order.order());

    let paginator = query.paginate(db, page.limit);
    let total = paginator.num_items().await?;
    let models = paginator.fetch_page(page.index()).await?;

    Ok((with_tags(db, models).await?, total))
}

/// Draft/published counts over all of an owner's sessions.
pub async fn status_counts<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
) -> Result<StatusCounts, DbErr> {
    let draft = Session::find()
        .filter(session::Column::OwnerId.eq(owner_id))
        .filter(session::Column::Status.eq(Status::Draft))
        .count(db)
        .await?;
    let published = Session::find()
        .filter(session::Column::OwnerId.eq(owner_id))
        .filter(session::Column::Status.eq(Status::Published))
        .count(db)
        .await?;

    Ok(StatusCounts {
        total: draft + published,
        draft,
        published,
    })
}

/// An owner's most recently updated sessions.
pub async fn recently_updated<C: ConnectionTrait>(
    db: &C,
    owner_id: &str,
    limit: u64,
) -> Result<Vec<Model>, DbErr> {
    Session::find()
        .filter(session::Column::OwnerId.eq(owner_id))
        .order_by_desc(session::Column::UpdatedAt)
        .order_by_desc(session::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Tag usage within `scope`: every occurrence counts, highest count first,
/// ties by tag name.
pub async fn tag_counts<C: ConnectionTrait>(
    db: &C,
    scope: &Scope,
    limit: Option<u64>,
) -> Result<Vec<TagCount>, DbErr> {
    let sessions_in_scope = Query::select()
        .column(session::Column::Id)
        .from(Session)
        .cond_where(scope_condition(scope))
        .to_owned();

    let usage: SimpleExpr = Func::count(Expr::col((SessionTag, session_tag::Column::Tag))).into();

    let mut query = SessionTag::find()
        .select_only()
        .column(session_tag::Column::Tag)
        .column_as(usage.clone(), "count")
        .filter(session_tag::Column::SessionId.in_subquery(sessions_in_scope))
        .group_by(session_tag::Column::Tag)
        .order_by_desc(usage)
        .order_by_asc(session_tag::Column::Tag);

    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.into_model::<TagCount>().all(db).await
}

// ── Writes ──
//
// Each write is one transaction covering the session row and its tag rows.
// The row is written before the tags so concurrent writers to the same
// session serialize on it.

pub async fn create(
    db: &DatabaseConnection,
    owner_id: &str,
    input: SessionInput,
    status: Status,
) -> Result<SessionRecord, DbErr> {
    let txn = db.begin().await?;
    let at = session::now();

    let model = session::ActiveModel {
        id: Set(ids::generate()),
        owner_id: Set(owner_id.to_string()),
        title: Set(input.title),
        content: Set(input.content),
        save_file_url: Set(input.save_file_url),
        status: Set(status),
        created_at: Set(at),
        updated_at: Set(at),
    }
    .insert(&txn)
    .await?;

    replace_tags(&txn, &model.id, &input.tags).await?;
    txn.commit().await?;

    Ok(SessionRecord {
        session: model,
        tags: input.tags,
    })
}

/// Replace every editable field of `current` and set `status`.
pub async fn update(
    db: &DatabaseConnection,
    current: Model,
    input: SessionInput,
    status: Status,
) -> Result<SessionRecord, DbErr> {
    let txn = db.begin().await?;
    let updated_at = session::next_updated_at(current.updated_at);

    let mut active: session::ActiveModel = current.into();
    active.title = Set(input.title);
    active.content = Set(input.content);
    active.save_file_url = Set(input.save_file_url);
    active.status = Set(status);
    active.updated_at = Set(updated_at);
    let model = active.update(&txn).await?;

    replace_tags(&txn, &model.id, &input.tags).await?;
    txn.commit().await?;

    Ok(SessionRecord {
        session: model,
        tags: input.tags,
    })
}

/// Change only the status of `current`.
pub async fn set_status(
    db: &DatabaseConnection,
    current: Model,
    status: Status,
) -> Result<SessionRecord, DbErr> {
    let updated_at = session::next_updated_at(current.updated_at);

    let mut active: session::ActiveModel = current.into();
    active.status = Set(status);
    active.updated_at = Set(updated_at);
    let model = active.update(db).await?;

    let tags = load_tags(db, std::slice::from_ref(&model.id))
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(SessionRecord {
        session: model,
        tags,
    })
}

pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    SessionTag::delete_many()
        .filter(session_tag::Column::SessionId.eq(id))
        .exec(&txn)
        .await?;
    Session::delete_by_id(id.to_string()).exec(&txn).await?;
    txn.commit().await
}

// ── Helpers ──

fn scope_condition(scope: &Scope) -> Condition {
    match scope {
        Scope::Published => {
            Condition::all().add(session::Column::Status.eq(Status::Published))
        }
        Scope::Owner(owner_id) => {
            Condition::all().add(session::Column::OwnerId.eq(owner_id.as_str()))
        }
    }
}

fn filter_condition(filter: &SessionFilter) -> Condition {
    let mut condition = scope_condition(&filter.scope);

    if let Some(status) = filter.status {
        condition = condition.add(session::Column::Status.eq(status));
    }

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        condition = condition.add(search_condition(term));
    }

    if !filter.tags.is_empty() {
        let tagged = Query::select()
            .column(session_tag::Column::SessionId)
            .from(SessionTag)
            .and_where(session_tag::Column::Tag.is_in(filter.tags.iter().cloned()))
            .to_owned();
        condition = condition.add(session::Column::Id.in_subquery(tagged));
    }

    condition
}

fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    let matches = |column: session::Column| {
        Expr::expr(Func::lower(Expr::col((Session, column))))
            .like(LikeExpr::new(pattern.clone()).escape('\\'))
    };

    Condition::any()
        .add(matches(session::Column::Title))
        .add(matches(session::Column::Content))
}

/// Escape LIKE wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

async fn load_tags<C: ConnectionTrait>(
    db: &C,
    session_ids: &[String],
) -> Result<HashMap<String, Vec<String>>, DbErr> {
    if session_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = SessionTag::find()
        .filter(session_tag::Column::SessionId.is_in(session_ids.iter().cloned()))
        .order_by_asc(session_tag::Column::SessionId)
        .order_by_asc(session_tag::Column::Position)
        .all(db)
        .await?;

    let mut tags: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        tags.entry(row.session_id).or_default().push(row.tag);
    }
    Ok(tags)
}

async fn with_tags<C: ConnectionTrait>(
    db: &C,
    models: Vec<Model>,
) -> Result<Vec<SessionRecord>, DbErr> {
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
    let mut tags = load_tags(db, &ids).await?;

    Ok(models
        .into_iter()
        .map(|session| {
            let tags = tags.remove(&session.id).unwrap_or_default();
            SessionRecord { session, tags }
        })
        .collect())
}

async fn replace_tags<C: ConnectionTrait>(
    db: &C,
    session_id: &str,
    tags: &[String],
) -> Result<(), DbErr> {
    SessionTag::delete_many()
        .filter(session_tag::Column::SessionId.eq(session_id))
        .exec(db)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }

    let rows = tags
        .iter()
        .enumerate()
        .map(|(position, tag)| session_tag::ActiveModel {
            session_id: Set(session_id.to_string()),
            position: Set(position as i32),
            tag: Set(tag.clone()),
            ..Default::default()
        });
    SessionTag::insert_many(rows).exec(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
        assert_eq!(escape_like("calm"), "calm");
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(SortField::parse("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::parse("updated_at"), Some(SortField::UpdatedAt));
        assert_eq!(SortField::parse("title"), Some(SortField::Title));
        assert_eq!(SortField::parse("owner_id"), None);
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}
