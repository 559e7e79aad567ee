//! Create `report` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Report::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Report::TrackingCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Report::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Report::Description).text().not_null())
                    .col(ColumnDef::new(Report::PhotoUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Report::HasLocation)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Report::Latitude).double())
                    .col(ColumnDef::new(Report::Longitude).double())
                    .col(ColumnDef::new(Report::Neighborhood).string_len(128))
                    .col(ColumnDef::new(Report::ReporterName).string_len(256))
                    .col(ColumnDef::new(Report::ReporterEmail).string_len(256))
                    .col(ColumnDef::new(Report::ReporterPhone).string_len(64))
                    .col(
                        ColumnDef::new(Report::Status)
                            .string_len(32)
                            .not_null()
                            .default("new"),
                    )
                    .col(ColumnDef::new(Report::AdminNote).text())
                    .col(
                        ColumnDef::new(Report::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Report::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: tracking_code (anonymous lookup key)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_tracking_code")
                    .table(Report::Table)
                    .col(Report::TrackingCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (dashboard filters)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_status")
                    .table(Report::Table)
                    .col(Report::Status)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_report_created_at")
                    .table(Report::Table)
                    .col(Report::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Report::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Report {
    Table,
    Id,
    TrackingCode,
    Title,
    Description,
    PhotoUrl,
    HasLocation,
    Latitude,
    Longitude,
    Neighborhood,
    ReporterName,
    ReporterEmail,
    ReporterPhone,
    Status,
    AdminNote,
    CreatedAt,
    UpdatedAt,
}
