use sea_orm::entity::prelude::*;

/// One tag of a session. `position` keeps the author's ordering, and
/// repeated tags are separate rows so usage counts include them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "session_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub session_id: String,

    pub position: i32,

    pub tag: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
