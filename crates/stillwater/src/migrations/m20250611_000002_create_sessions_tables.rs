use sea_orm_migration::prelude::*;

use super::m20250611_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ── sessions ──
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sessions::Id)
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sessions::OwnerId).string_len(24).not_null())
                    .col(ColumnDef::new(Sessions::Title).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Sessions::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Sessions::SaveFileUrl).string().null())
                    .col(
                        ColumnDef::new(Sessions::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Sessions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Sessions::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_owner")
                            .from(Sessions::Table, Sessions::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_owner_status")
                    .table(Sessions::Table)
                    .col(Sessions::OwnerId)
                    .col(Sessions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_owner_created")
                    .table(Sessions::Table)
                    .col(Sessions::OwnerId)
                    .col(Sessions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sessions_status_created")
                    .table(Sessions::Table)
                    .col(Sessions::Status)
                    .col(Sessions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ── session_tags ──
        manager
            .create_table(
                Table::create()
                    .table(SessionTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SessionTags::SessionId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SessionTags::Position).integer().not_null())
                    .col(ColumnDef::new(SessionTags::Tag).string_len(50).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_tags_session")
                            .from(SessionTags::Table, SessionTags::SessionId)
                            .to(Sessions::Table, Sessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_session_tags_session")
                    .table(SessionTags::Table)
                    .col(SessionTags::SessionId)
                    .col(SessionTags::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_session_tags_tag")
                    .table(SessionTags::Table)
                    .col(SessionTags::Tag)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SessionTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    OwnerId,
    Title,
    Content,
    SaveFileUrl,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SessionTags {
    Table,
    Id,
    SessionId,
    Position,
    Tag,
}
