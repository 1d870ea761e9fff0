//! Dataset statistics endpoint.

use axum::Json;
use axum::extract::State;
use nf_protocol::DataSummary;
use nf_tabular::data_summary;

use crate::error::{ApiError, ApiResult};
use crate::router::NOT_READY_MESSAGE;
use crate::state::AppState;

/// GET /api/summary: totals, value statistics, period and top suppliers.
pub async fn summary(State(state): State<AppState>) -> ApiResult<Json<DataSummary>> {
    let store = state
        .agent
        .snapshot()
        .ok_or_else(|| ApiError::NotReady(NOT_READY_MESSAGE.into()))?;
    Ok(Json(data_summary(&store)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use nf_tabular::mock::MockDatasetSource;
    use tower::ServiceExt;

    use crate::agent::AgentContext;
    use crate::inference::DisabledGenerator;
    use crate::router::QueryRouter;
    use crate::routes::build_router;
    use crate::state::AppState;

    #[tokio::test]
    async fn summary_of_sample_data() {
        let response = build_router(AppState::with_sample_data())
            .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["total_notas"], 5);
        assert_eq!(json["total_itens"], 7);
        assert_eq!(json["estatisticas_financeiras"]["maior_nota"], 1200.5);
        assert_eq!(json["principais_fornecedores"]["Papelaria Central LTDA"], 2);
        assert_eq!(json["principais_fornecedores"]["Comercial Minas ME"], 1);

        let text = std::str::from_utf8(&body).unwrap();
        assert!(text.contains(
            r#""principais_fornecedores":{"Papelaria Central LTDA":2,"Distribuidora Paulista S.A.":2,"Comercial Minas ME":1}"#
        ));
    }

    #[tokio::test]
    async fn summary_not_ready_is_503() {
        let agent = AgentContext::new(
            Arc::new(MockDatasetSource::sample()),
            QueryRouter::new(Arc::new(DisabledGenerator)),
        );
        let response = build_router(AppState::new(agent))
            .oneshot(Request::get("/api/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
    }
}
