//! # Eligibility Criteria Model
//!
//! Organizer-defined screening rules, one row per posting.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "eligibility_criteria")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub posting_id: String,

    /// Serialized `eligibility::Criteria`
    #[sea_orm(column_type = "JsonBinary")]
    pub criteria: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posting::Entity",
        from = "Column::PostingId",
        to = "super::posting::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Posting,
}

impl Related<super::posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
