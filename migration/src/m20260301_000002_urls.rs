use sea_orm_migration::prelude::*;

use super::m20260301_000001_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Url::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Url::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Url::UserId).string().not_null())
                    .col(ColumnDef::new(Url::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(Url::ShortCode).string_len(64).not_null())
                    .col(ColumnDef::new(Url::Title).string().null())
                    .col(
                        ColumnDef::new(Url::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Url::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Url::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Url::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_urls_user_id")
                            .from(Url::Table, Url::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 短码唯一，并发创建同一短码时由数据库拒绝
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_short_code")
                    .table(Url::Table)
                    .col(Url::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按用户列出链接（创建时间倒序）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_user_created")
                    .table(Url::Table)
                    .col(Url::UserId)
                    .col(Url::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_user_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_short_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Url::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Url {
    #[sea_orm(iden = "urls")]
    Table,
    Id,
    UserId,
    OriginalUrl,
    ShortCode,
    Title,
    Clicks,
    ExpiresAt,
    CreatedAt,
    UpdatedAt,
}
