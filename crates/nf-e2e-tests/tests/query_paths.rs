//! E2E tests for question routing through the HTTP API.

mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestHarness;
use nf_agent_api::inference::DisabledGenerator;
use nf_agent_api::router::NOT_READY_MESSAGE;

/// Every rule intent is answered from the extracted archive.
#[tokio::test]
async fn e2e_all_four_intents_answered() {
    let (h, generator) = TestHarness::loaded_with_mock("unused").await;

    let cases = [
        (
            "Qual fornecedor teve maior montante recebido?",
            "🏆 O fornecedor com maior montante é: **Comercial Minas ME** com R$ 1,200.50",
        ),
        (
            "Qual item teve maior volume? Qual produto foi o mais vendido?",
            "📦 O produto mais vendido é: **Papel A4** com 25 unidades",
        ),
        (
            "Quais estados emitiram mais notas?",
            "📍 Estados com mais emissões:\n• SP: 3 notas\n• RJ: 1 notas\n• MG: 1 notas",
        ),
    ];
    for (question, expected) in cases {
        let (status, body) = h.ask(question).await;
        assert_eq!(status, StatusCode::OK, "{question}");
        assert_eq!(body["tier"], "rules", "{question}");
        assert_eq!(body["response"], expected, "{question}");
    }

    let (status, body) = h.ask("Quais as maiores notas?").await;
    assert_eq!(status, StatusCode::OK);
    let lines: Vec<&str> = body["response"].as_str().unwrap().lines().collect();
    assert_eq!(
        lines,
        [
            "💰 As 10 maiores notas fiscais:",
            "• Comercial Minas ME: R$ 1,200.50",
            "• Distribuidora Paulista S.A.: R$ 250.00",
            "• Papelaria Central LTDA: R$ 100.00",
            "• Papelaria Central LTDA: R$ 80.25",
            "• Distribuidora Paulista S.A.: R$ 50.00",
        ]
    );

    assert!(generator.calls().is_empty(), "rule matches never reach the fallback");
}

/// Ambiguous vocabulary resolves by rule order, not by best fit.
#[tokio::test]
async fn e2e_rule_precedence_over_http() {
    let (h, _) = TestHarness::loaded_with_mock("unused").await;

    let (_, body) = h.ask("maiores notas por fornecedor").await;
    assert!(body["response"].as_str().unwrap().starts_with("🏆"));

    let (_, body) = h.ask("maiores notas por estado").await;
    assert!(body["response"].as_str().unwrap().starts_with("📍"));
}

/// Unmatched questions go to the fallback once, trimmed, original case.
#[tokio::test]
async fn e2e_unmatched_question_reaches_fallback_once() {
    let (h, generator) = TestHarness::loaded_with_mock("\n🧾 Há 7 itens no total.\n").await;

    let (status, body) = h.ask("  Quantos ITENS existem?  ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["tier"], "fallback");
    assert_eq!(body["question"], "Quantos ITENS existem?");
    assert_eq!(body["response"], "🧾 Há 7 itens no total.");
    assert_eq!(generator.calls(), ["Quantos ITENS existem?"]);
}

/// Before the first load, every data endpoint is unavailable.
#[tokio::test]
async fn e2e_not_ready_before_first_load() {
    let h = TestHarness::with_archive(Arc::new(DisabledGenerator));

    let (status, body) = h.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_ready"], false);
    assert!(body["dataset"].is_null());

    let (status, body) = h.ask("maior montante").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], NOT_READY_MESSAGE);

    let (status, _) = h.get("/api/summary").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

/// Client errors, not-ready and fallback failures are all distinguishable.
#[tokio::test]
async fn e2e_error_statuses_are_distinct() {
    let h = TestHarness::with_archive(Arc::new(DisabledGenerator));
    let (not_ready, _) = h.post_json("/api/query", json!({})).await;
    assert_eq!(not_ready, StatusCode::SERVICE_UNAVAILABLE);

    h.load().await;

    let (missing, body) = h.post_json("/api/query", json!({})).await;
    assert_eq!(missing, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (blank, _) = h.ask(" \t ").await;
    assert_eq!(blank, StatusCode::BAD_REQUEST);

    let (no_body, _) = h.post_empty("/api/query").await;
    assert_eq!(no_body, StatusCode::BAD_REQUEST);

    let (failed, body) = h.ask("Qual a média por nota?").await;
    assert_eq!(failed, StatusCode::OK);
    assert_eq!(body["tier"], "error");
    assert!(body["response"].as_str().unwrap().starts_with("❌ Erro ao processar pergunta"));
    assert!(body["diagnostic"].is_string());
}

/// The summary endpoint reflects the extracted archive.
#[tokio::test]
async fn e2e_summary_after_load() {
    let (h, _) = TestHarness::loaded_with_mock("unused").await;

    let (status, body) = h.get("/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_notas"], 5);
    assert_eq!(body["total_itens"], 7);
    assert_eq!(body["estatisticas_financeiras"]["valor_total"], 1680.75);
    assert_eq!(body["periodo"]["inicio"], "2024-01-02T08:00:00");
    assert_eq!(body["periodo"]["fim"], "2024-01-31T17:45:00");
    let suppliers = body["principais_fornecedores"].as_object().unwrap();
    assert_eq!(suppliers.len(), 3);
    assert_eq!(suppliers["Distribuidora Paulista S.A."], 2);
}
