//! Question endpoint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use nf_protocol::{AnswerTier, QueryRequest, QueryResponse};

use crate::error::{ApiError, ApiResult};
use crate::router::NOT_READY_MESSAGE;
use crate::state::AppState;

const MISSING_QUESTION: &str = "Pergunta não fornecida";
const EMPTY_QUESTION: &str = "Pergunta vazia";

/// POST /api/query: answer a question about the loaded invoices.
///
/// 503 when no dataset is loaded, 400 for a missing or blank question,
/// 500 if routing itself panics. Fallback failures are still a 200 whose
/// answer carries the error marker.
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponse>> {
    if !state.agent.is_ready() {
        return Err(ApiError::NotReady(NOT_READY_MESSAGE.into()));
    }

    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected query body");
        ApiError::BadRequest(MISSING_QUESTION.into())
    })?;
    let question = request
        .question
        .ok_or_else(|| ApiError::BadRequest(MISSING_QUESTION.into()))?
        .trim()
        .to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_QUESTION.into()));
    }

    tracing::info!(question = %question, "processing question");

    let agent = state.agent.clone();
    let routed = question.clone();
    let outcome = tokio::spawn(async move { agent.query(&routed).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "query task failed");
            ApiError::Internal(format!("Erro interno ao processar pergunta: {e}"))
        })?;

    // A reload may have started between the readiness check and routing.
    if outcome.tier == AnswerTier::NotReady {
        return Err(ApiError::NotReady(outcome.answer));
    }

    tracing::info!(tier = ?outcome.tier, "question answered");
    Ok(Json(QueryResponse {
        status: "success".into(),
        response: outcome.answer,
        question,
        tier: outcome.tier,
        diagnostic: outcome.diagnostic,
    }))
}
