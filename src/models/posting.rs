//! Posting entity model
//!
//! A team or hackathon posting created by an organizer. `remaining_slots` is
//! decremented exclusively by the acceptance transaction.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "postings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Identity of the organizer who owns this posting
    pub owner_id: String,

    pub team_name: Option<String>,

    pub hackathon_name: Option<String>,

    /// Required skills (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub required_skills: Json,

    pub role: Option<String>,

    pub experience: Option<String>,

    /// Open slots left on the team; never negative
    pub remaining_slots: i32,

    /// Registration deadline used by the due-verification sweep
    pub reg_date: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::application::Entity")]
    Application,
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn required_skill_list(&self) -> Vec<String> {
        super::string_list(&self.required_skills)
    }
}
