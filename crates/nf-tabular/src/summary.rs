//! Dataset statistics for the summary endpoint and the model prompt.

use nf_protocol::{DataSummary, DateRange, FinancialStats, SupplierCount};

use crate::aggregate::{TOP_STATES, product_totals, state_counts, supplier_counts, supplier_totals};
use crate::format::{format_count, format_money, format_quantity_grouped};
use crate::store::TabularStore;

/// Suppliers listed in `DataSummary::top_suppliers`.
const SUMMARY_TOP_SUPPLIERS: usize = 5;
/// Suppliers and products listed in the prompt context.
const CONTEXT_TOP_N: usize = 10;

/// Totals, mean/max value, issue-date range and top suppliers by count.
pub fn data_summary(store: &TabularStore) -> DataSummary {
    let headers = store.headers();
    let total_value: f64 = headers.iter().map(|h| h.total_value).sum();
    let mean_value = (!headers.is_empty()).then(|| total_value / headers.len() as f64);
    let max_value = headers.iter().map(|h| h.total_value).reduce(f64::max);

    let start = headers.iter().map(|h| h.issued_at).min();
    let end = headers.iter().map(|h| h.issued_at).max();
    let period = start.zip(end).map(|(start, end)| DateRange { start, end });

    let top_suppliers = supplier_counts(headers)
        .into_iter()
        .take(SUMMARY_TOP_SUPPLIERS)
        .map(|(name, count)| SupplierCount {
            name: name.to_string(),
            count,
        })
        .collect();

    DataSummary {
        total_invoices: headers.len(),
        total_items: store.items().len(),
        financials: FinancialStats {
            total_value,
            mean_value,
            max_value,
        },
        period,
        top_suppliers,
    }
}

/// Plain-text overview of the dataset for a text-generation prompt.
pub fn context_summary(store: &TabularStore) -> String {
    let summary = data_summary(store);
    let mut lines = vec![
        "DADOS DAS NOTAS FISCAIS:".to_string(),
        format!(
            "- Total de notas fiscais: {}",
            format_count(summary.total_invoices)
        ),
        format!("- Total de itens: {}", format_count(summary.total_items)),
        format!(
            "- Valor total das notas: R$ {}",
            format_money(summary.financials.total_value)
        ),
        format!(
            "- Valor médio por nota: R$ {}",
            format_money(summary.financials.mean_value.unwrap_or(0.0))
        ),
        String::new(),
        format!("TOP {CONTEXT_TOP_N} FORNECEDORES POR MONTANTE:"),
    ];

    lines.extend(
        supplier_totals(store.headers())
            .into_iter()
            .take(CONTEXT_TOP_N)
            .map(|(name, value)| format!("- {name}: R$ {}", format_money(value))),
    );

    lines.push(String::new());
    lines.push(format!("TOP {CONTEXT_TOP_N} PRODUTOS POR QUANTIDADE:"));
    lines.extend(
        product_totals(store.items())
            .into_iter()
            .take(CONTEXT_TOP_N)
            .map(|(name, qty)| format!("- {name}: {} unidades", format_quantity_grouped(qty))),
    );

    lines.push(String::new());
    lines.push(format!("TOP {TOP_STATES} ESTADOS EMITENTES:"));
    lines.extend(
        state_counts(store.headers())
            .into_iter()
            .take(TOP_STATES)
            .map(|(state, count)| format!("- {state}: {} notas", format_count(count))),
    );

    lines.join("\n")
}
