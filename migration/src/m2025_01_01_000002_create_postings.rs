//! Migration to create the postings table.
//!
//! A posting is a team/hackathon entry owned by an organizer. The
//! `remaining_slots` column is only ever decremented by the acceptance
//! transaction and must stay non-negative.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Postings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Postings::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Postings::OwnerId).text().not_null())
                    .col(ColumnDef::new(Postings::TeamName).text().null())
                    .col(ColumnDef::new(Postings::HackathonName).text().null())
                    .col(
                        ColumnDef::new(Postings::RequiredSkills)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Postings::Role).text().null())
                    .col(ColumnDef::new(Postings::Experience).text().null())
                    .col(
                        ColumnDef::new(Postings::RemainingSlots)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Postings::RemainingSlots).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Postings::RegDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Postings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Postings::UpdatedAt)
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
                    .name("idx_postings_owner_id")
                    .table(Postings::Table)
                    .col(Postings::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_postings_owner_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Postings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Postings {
    Table,
    Id,
    OwnerId,
    TeamName,
    HackathonName,
    RequiredSkills,
    Role,
    Experience,
    RemainingSlots,
    RegDate,
    CreatedAt,
    UpdatedAt,
}
