//! Per-posting application analytics

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::criteria::{Criteria, skill_overlap};
use super::store::ApplicationView;
use crate::models::ApplicationStatus;

const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SkillCount {
    pub skill: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostingAnalytics {
    pub total: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub pending: u64,
    pub top_skills: Vec<SkillCount>,
    /// Null when the posting's criteria declare no required skills
    pub average_overlap: Option<f64>,
}

pub fn summarize(criteria: Option<&Criteria>, applications: &[ApplicationView]) -> PostingAnalytics {
    let count_status = |status: ApplicationStatus| {
        applications.iter().filter(|a| a.status == status).count() as u64
    };

    let mut skill_counts: HashMap<String, u64> = HashMap::new();
    for application in applications {
        for skill in &application.skills {
            let normalized = skill.trim().to_lowercase();
            if !normalized.is_empty() {
                *skill_counts.entry(normalized).or_default() += 1;
            }
        }
    }
    let mut top_skills: Vec<SkillCount> = skill_counts
        .into_iter()
        .map(|(skill, count)| SkillCount { skill, count })
        .collect();
    top_skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    top_skills.truncate(TOP_SKILLS);

    let required = criteria.map(Criteria::normalized_required).unwrap_or_default();
    let average_overlap = if required.is_empty() || applications.is_empty() {
        None
    } else {
        let sum: usize = applications
            .iter()
            .map(|a| skill_overlap(&required, &a.skills))
            .sum();
        Some(sum as f64 / applications.len() as f64)
    };

    PostingAnalytics {
        total: applications.len() as u64,
        accepted: count_status(ApplicationStatus::Accepted),
        rejected: count_status(ApplicationStatus::Rejected),
        pending: count_status(ApplicationStatus::Pending),
        top_skills,
        average_overlap,
    }
}
