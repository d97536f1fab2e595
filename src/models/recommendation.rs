//! Recommendation entity model
//!
//! Persisted score for one (team, applicant) pair. The pair is unique; a
//! re-score overwrites the row in place.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recommendations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub team_id: String,

    pub applicant_id: String,

    /// Score in the 0-100 range
    pub score: f64,

    /// Match breakdown; `matchedSkills` is read back on cache hits
    #[sea_orm(column_type = "JsonBinary")]
    pub details: Json,

    /// Free-form skill -> rating map
    #[sea_orm(column_type = "JsonBinary")]
    pub rated_skills: Json,

    /// Which scorer produced the row (`gemini`, `openai`, `local`)
    pub provenance: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
