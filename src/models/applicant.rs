//! Applicant entity model
//!
//! Candidate profile as captured at sign-up: identity, declared skills and
//! optional resume / LinkedIn / GitHub references.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "applicants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: Option<String>,

    pub email: Option<String>,

    /// Declared skills (JSON array of strings)
    #[sea_orm(column_type = "JsonBinary")]
    pub skills: Json,

    pub resume_url: Option<String>,

    pub linkedin_url: Option<String>,

    pub github_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
    /// Declared skills as plain strings
    pub fn skill_list(&self) -> Vec<String> {
        super::string_list(&self.skills)
    }
}
