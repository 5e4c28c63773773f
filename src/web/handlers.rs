use actix_web::{web, HttpResponse, Responder};
use log::{debug, info};
use serde_json::json;

use crate::conversation::{
    append_and_bound, render_prompt, History, Role, MAX_HISTORY, SYSTEM_PREAMBLE,
};
use crate::prompts::{attach_policy_link, parse_grade};
use crate::web::error::ApiError;
use crate::web::models::{
    ChatRequest, ChatResponse, EvaluateRequest, EvaluateResponse, PolicyRecommendationRequest,
    PolicyRecommendationResponse,
};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Policy recommendation endpoint
pub async fn recommend_policy(
    data: web::Data<AppState>,
    req: web::Json<PolicyRecommendationRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(
        "Policy recommendation for customer {} ({} insurance)",
        req.customer_id, req.insurance_type
    );

    let prompt = data.templates.policy_prompt(&req)?;
    debug!("Policy prompt: {}", prompt);

    let recommendation = data.model.generate_text(prompt).await?;

    Ok(HttpResponse::Ok().json(PolicyRecommendationResponse {
        recommendation: attach_policy_link(&recommendation),
    }))
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let ChatRequest {
        user_message,
        history,
    } = req.into_inner();

    if user_message.trim().is_empty() {
        return Err(ApiError::Validation("user_message must not be empty".to_string()));
    }
    if history.len() > MAX_HISTORY {
        return Err(ApiError::Validation(format!(
            "history may hold at most {} messages, got {}",
            MAX_HISTORY,
            history.len()
        )));
    }

    info!(
        "Chat request with {} prior message(s): {}",
        history.len(),
        user_message
    );

    let history = append_and_bound(History::from_messages(history), Role::User, user_message);
    let prompt = render_prompt(&history, SYSTEM_PREAMBLE);
    debug!("Chat prompt ({} turns): {}", history.len(), prompt);

    let reply = data.model.generate_text(prompt).await?;
    let history = append_and_bound(history, Role::Assistant, reply.clone());

    Ok(HttpResponse::Ok().json(ChatResponse {
        bot_message: reply,
        history: history.into_messages(),
    }))
}

// Code grading endpoint
pub async fn evaluate(
    data: web::Data<AppState>,
    req: web::Json<EvaluateRequest>,
) -> Result<HttpResponse, ApiError> {
    if req.teacher_code.trim().is_empty() || req.student_code.trim().is_empty() {
        return Err(ApiError::Validation(
            "Both teacher_code and student_code must be provided".to_string(),
        ));
    }

    info!(
        "Evaluating student code ({} bytes) against reference ({} bytes)",
        req.student_code.len(),
        req.teacher_code.len()
    );

    let segments = data
        .templates
        .evaluation_segments(&req.teacher_code, &req.student_code)?;
    let result = data.model.generate(&segments).await?;
    let grade = parse_grade(&result);

    Ok(HttpResponse::Ok().json(EvaluateResponse {
        result,
        match_percent: grade.match_percent,
        score: grade.score,
    }))
}
