//! Prompt templates for the stateless endpoints and the post-processing of
//! what the model sends back.

use anyhow::Result;
use tera::{Context, Tera};

use crate::web::models::PolicyRecommendationRequest;

pub const POLICY_LINK_PLACEHOLDER: &str = "[Placeholder for Policy Details Page Link]";
pub const POLICY_DETAILS_URL: &str =
    "https://www.exampleinsurance.com/policies/securefuture-family-protector";

/// Upper bound of the grading score the model is asked for.
pub const MAX_SCORE: u32 = 10;

const POLICY_TEMPLATE: &str = "policy_recommendation.txt";
const EVALUATION_TEMPLATE: &str = "code_evaluation.txt";

pub struct PromptTemplates {
    tera: Tera,
}

impl PromptTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (
                POLICY_TEMPLATE,
                include_str!("../templates/policy_recommendation.txt"),
            ),
            (
                EVALUATION_TEMPLATE,
                include_str!("../templates/code_evaluation.txt"),
            ),
        ])?;
        Ok(Self { tera })
    }

    pub fn policy_prompt(&self, req: &PolicyRecommendationRequest) -> Result<String> {
        let mut context = Context::new();
        context.insert("customer_id", &req.customer_id);
        context.insert("insurance_type", &req.insurance_type);
        context.insert("customer_age", &req.customer_age);
        context.insert("employment_status", &req.employment_status);
        context.insert("marital_status", &req.marital_status);
        context.insert("dependents", &req.dependents);
        context.insert("health_status", &req.health_status);
        context.insert("existing_coverage", &req.existing_coverage);
        context.insert("additional_financial_goals", &req.additional_financial_goals);
        context.insert("text_data", &req.text_data);
        context.insert("numerical_data", &req.numerical_data.to_string());
        context.insert("behavioral_data", &req.behavioral_data.to_string());
        context.insert("link_placeholder", POLICY_LINK_PLACEHOLDER);

        Ok(self.tera.render(POLICY_TEMPLATE, &context)?)
    }

    /// Instructions, reference code and student code, as separate segments
    /// of a single model call.
    pub fn evaluation_segments(
        &self,
        teacher_code: &str,
        student_code: &str,
    ) -> Result<Vec<String>> {
        let mut context = Context::new();
        context.insert("max_score", &MAX_SCORE);
        let instructions = self.tera.render(EVALUATION_TEMPLATE, &context)?;

        Ok(vec![
            instructions,
            format!("Teacher's code:\n{}", teacher_code),
            format!("Student's code:\n{}", student_code),
        ])
    }
}

/// Points the recommendation at the policy details page, either by filling in
/// the placeholder or by appending a link line.
pub fn attach_policy_link(recommendation: &str) -> String {
    if recommendation.contains(POLICY_LINK_PLACEHOLDER) {
        recommendation.replace(POLICY_LINK_PLACEHOLDER, POLICY_DETAILS_URL)
    } else {
        format!(
            "{}\n\nFor more details, please visit: [Policy Details]({})",
            recommendation, POLICY_DETAILS_URL
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GradeSummary {
    pub match_percent: Option<f64>,
    pub score: Option<f64>,
}

/// Picks the `Match: N%` and `Score: N/10` lines out of a grading reply.
/// Markdown emphasis around the labels is tolerated.
pub fn parse_grade(result: &str) -> GradeSummary {
    let mut summary = GradeSummary::default();
    for line in result.lines() {
        let line = line.trim().trim_matches(|c| c == '*' || c == '-' || c == ' ');
        let lower = line.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("match") {
            summary.match_percent = summary.match_percent.or_else(|| leading_number(rest));
        } else if let Some(rest) = lower.strip_prefix("score") {
            summary.score = summary.score.or_else(|| leading_number(rest));
        }
    }
    summary
}

fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start_matches(|c: char| c == ':' || c == '*' || c.is_whitespace());
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    text[..end].parse().ok()
}
