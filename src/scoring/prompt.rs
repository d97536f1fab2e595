//! Scoring prompt construction
//!
//! Providers receive one prompt for the whole batch. Resume and GitHub text
//! is truncated to a preview so large profiles cannot blow the token budget.

use serde::Serialize;

use super::types::{EnrichedApplicant, TeamRequirement};

/// Repository names embedded per applicant.
const PROMPT_REPO_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamPreview<'a> {
    required_skills: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    team_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hackathon_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplicantPreview<'a> {
    id: &'a str,
    name: Option<&'a str>,
    skills: &'a [String],
    resume_available: bool,
    resume_preview_text: Option<String>,
    github_summary: Option<&'a [String]>,
    github_profile_preview: Option<String>,
}

/// Build the batch prompt sent to every provider.
pub fn build_prompt(
    team: &TeamRequirement,
    applicants: &[EnrichedApplicant],
    preview_chars: usize,
) -> String {
    let team_preview = TeamPreview {
        required_skills: &team.required_skills,
        team_name: team.team_name.as_deref(),
        hackathon_name: team.hackathon_name.as_deref(),
        role: team.role.as_deref(),
        experience: team.experience.as_deref(),
    };
    let previews: Vec<ApplicantPreview<'_>> = applicants
        .iter()
        .map(|a| ApplicantPreview {
            id: a.id(),
            name: a.applicant.name.as_deref(),
            skills: &a.applicant.skills,
            resume_available: a.resume_text.is_some() || a.applicant.resume_url.is_some(),
            resume_preview_text: a
                .resume_text
                .as_deref()
                .map(|text| truncate_preview(text, preview_chars)),
            github_summary: a
                .github_repo_names
                .as_deref()
                .map(|names| &names[..names.len().min(PROMPT_REPO_LIMIT)]),
            github_profile_preview: a
                .github_profile_text
                .as_deref()
                .map(|text| truncate_preview(text, preview_chars)),
        })
        .collect();

    let team_json = serde_json::to_string(&team_preview).unwrap_or_else(|_| "{}".to_string());
    let applicants_json = serde_json::to_string(&previews).unwrap_or_else(|_| "[]".to_string());

    format!(
        "IMPORTANT: Your response MUST be valid JSON only. Do NOT include any explanatory text, \
markdown, or code fences. Start the response with '[' and end with ']'.\n\n\
You are an automated applicant tracking scorer. Return a JSON array with one object per applicant \
with fields: applicantId (string, copied from the applicant id), score (number 0-100 reflecting how \
well the applicant matches the team's required skills), ratedSkills (object mapping skill name to a \
0-10 rating based on the applicant's projects and repositories), rationale (short string), and \
details (object with matchedSkills array and skillMatchCount integer).\n\
Team: {team_json}.\n\
Applicants (preview): {applicants_json}.\n\n\
Notes: only a preview of resume and profile text is included. Match required skills against resume \
text, declared skills and GitHub repository names."
    )
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
