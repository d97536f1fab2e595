//! Migration to create the eligibility_criteria table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EligibilityCriteria::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EligibilityCriteria::PostingId)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EligibilityCriteria::Criteria)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EligibilityCriteria::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EligibilityCriteria::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_eligibility_criteria_posting_id")
                            .from(EligibilityCriteria::Table, EligibilityCriteria::PostingId)
                            .to(Postings::Table, Postings::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EligibilityCriteria::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EligibilityCriteria {
    Table,
    PostingId,
    Criteria,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Postings {
    Table,
    Id,
}
