//! Migration to create the applicants table.
//!
//! Applicants are the candidate profiles referenced by applications and
//! recommendations. Identifiers come from the upstream identity provider.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applicants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applicants::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applicants::Name).text().null())
                    .col(ColumnDef::new(Applicants::Email).text().null())
                    .col(ColumnDef::new(Applicants::Skills).json_binary().not_null())
                    .col(ColumnDef::new(Applicants::ResumeUrl).text().null())
                    .col(ColumnDef::new(Applicants::LinkedinUrl).text().null())
                    .col(ColumnDef::new(Applicants::GithubUrl).text().null())
                    .col(
                        ColumnDef::new(Applicants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applicants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Applicants {
    Table,
    Id,
    Name,
    Email,
    Skills,
    ResumeUrl,
    LinkedinUrl,
    GithubUrl,
    CreatedAt,
}
