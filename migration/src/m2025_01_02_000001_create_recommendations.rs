//! Migration to create the recommendations table.
//!
//! Stores one score record per (team, applicant). The composite unique index
//! is what makes upserts idempotent.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recommendations::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recommendations::TeamId).text().not_null())
                    .col(
                        ColumnDef::new(Recommendations::ApplicantId)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Recommendations::Score).double().not_null())
                    .col(
                        ColumnDef::new(Recommendations::Details)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::RatedSkills)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::Provenance)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Recommendations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Recommendations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_recommendations_team_applicant")
                    .table(Recommendations::Table)
                    .col(Recommendations::TeamId)
                    .col(Recommendations::ApplicantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_recommendations_team_applicant")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Recommendations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Recommendations {
    Table,
    Id,
    TeamId,
    ApplicantId,
    Score,
    Details,
    RatedSkills,
    Provenance,
    CreatedAt,
    UpdatedAt,
}
