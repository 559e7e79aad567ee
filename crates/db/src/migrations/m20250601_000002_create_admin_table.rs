//! Create `admin` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Admin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Admin::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Admin::Email).string_len(256).not_null())
                    .col(ColumnDef::new(Admin::FullName).string_len(256))
                    .col(
                        ColumnDef::new(Admin::IsSuperAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Admin::PasswordHash).string_len(256))
                    .col(ColumnDef::new(Admin::Token).string_len(64))
                    .col(ColumnDef::new(Admin::CreatedBy).string_len(32))
                    .col(
                        ColumnDef::new(Admin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: email (sign-in key)
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_email")
                    .table(Admin::Table)
                    .col(Admin::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: token (auth middleware lookup)
        manager
            .create_index(
                Index::create()
                    .name("idx_admin_token")
                    .table(Admin::Table)
                    .col(Admin::Token)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Admin::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Admin {
    Table,
    Id,
    Email,
    FullName,
    IsSuperAdmin,
    PasswordHash,
    Token,
    CreatedBy,
    CreatedAt,
}
