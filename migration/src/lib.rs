//! Database migrations for the matchmaker service.
//!
//! Schema is managed with SeaORM Migration and applied at startup.

pub use sea_orm_migration::prelude::*;

mod m2025_01_01_000001_create_applicants;
mod m2025_01_01_000002_create_postings;
mod m2025_01_01_000003_create_applications;
mod m2025_01_02_000001_create_recommendations;
mod m2025_01_02_000002_create_eligibility_criteria;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_01_000001_create_applicants::Migration),
            Box::new(m2025_01_01_000002_create_postings::Migration),
            Box::new(m2025_01_01_000003_create_applications::Migration),
            Box::new(m2025_01_02_000001_create_recommendations::Migration),
            Box::new(m2025_01_02_000002_create_eligibility_criteria::Migration),
        ]
    }
}
