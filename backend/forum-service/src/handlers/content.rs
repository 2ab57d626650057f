use super::AppState;
use crate::error::{ForumError, Result};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct TransformContentRequest {
    pub content: String,
    pub title: Option<String>,
    /// When present the author's posting cooldown is enforced
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransformContentResponse {
    pub content: String,
    pub title: Option<String>,
}

/// Moderate a post or comment body before it is stored.
///
/// The body goes through cross-reference linking and entity redaction, then
/// profanity masking. Titles are only profanity-masked.
pub async fn transform_content(
    state: web::Data<AppState>,
    req: web::Json<TransformContentRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();

    if req.content.trim().is_empty() {
        return Err(ForumError::InvalidInput("content is required".to_string()));
    }

    if let Some(user_id) = req.user_id {
        state.cooldown.try_acquire(user_id)?;
    }

    let transformed = state.transformer.transform(&req.content).await?;

    tracing::debug!(
        user_id = ?req.user_id,
        input_len = req.content.len(),
        output_len = transformed.len(),
        "Content transformed"
    );

    let content = mask_profanity(&state, transformed);
    let title = req.title.map(|title| mask_profanity(&state, title));

    Ok(HttpResponse::Ok().json(TransformContentResponse { content, title }))
}

fn mask_profanity(state: &AppState, text: String) -> String {
    if !state.profanity.is_profane(&text) {
        return text;
    }
    tracing::debug!("Masking profanity");
    state.profanity.clean(&text)
}
