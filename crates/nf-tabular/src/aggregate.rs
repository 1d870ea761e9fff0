//! Deterministic answers for the known intents.
//!
//! Each handler reads the base header/item sets of a loaded store (not the
//! join) and is pure. Groups keep first-appearance order before a stable
//! descending sort, so ties resolve to whichever key appears first in the
//! file.

use std::collections::HashMap;
use std::fmt;
use std::ops::AddAssign;

use nf_protocol::{HeaderRecord, Intent, ItemRecord};

use crate::format::{format_money, format_quantity};
use crate::store::TabularStore;

/// Number of states listed by `TopStatesByCount`.
pub const TOP_STATES: usize = 5;
/// Number of invoices listed by `TopInvoicesByValue`.
pub const TOP_INVOICES: usize = 10;

/// Result of running an intent handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    TopSupplier { name: String, amount: f64 },
    TopProduct { name: String, quantity: f64 },
    /// `(state, invoice count)`, descending, at most `TOP_STATES`.
    TopStates(Vec<(String, usize)>),
    /// `(issuer name, value)`, descending, at most `TOP_INVOICES`.
    TopInvoices(Vec<(String, f64)>),
    /// The underlying set has no rows.
    NoData(Intent),
}

/// Run the handler for `intent`.
pub fn answer(store: &TabularStore, intent: Intent) -> Answer {
    match intent {
        Intent::TopSupplierByAmount => top_supplier_by_amount(store.headers()),
        Intent::TopProductByQuantity => top_product_by_quantity(store.items()),
        Intent::TopStatesByCount => top_states_by_count(store.headers()),
        Intent::TopInvoicesByValue => top_invoices_by_value(store.headers()),
    }
}

pub fn top_supplier_by_amount(headers: &[HeaderRecord]) -> Answer {
    supplier_totals(headers)
        .into_iter()
        .next()
        .map(|(name, amount)| Answer::TopSupplier {
            name: name.to_string(),
            amount,
        })
        .unwrap_or(Answer::NoData(Intent::TopSupplierByAmount))
}

pub fn top_product_by_quantity(items: &[ItemRecord]) -> Answer {
    product_totals(items)
        .into_iter()
        .next()
        .map(|(name, quantity)| Answer::TopProduct {
            name: name.to_string(),
            quantity,
        })
        .unwrap_or(Answer::NoData(Intent::TopProductByQuantity))
}

pub fn top_states_by_count(headers: &[HeaderRecord]) -> Answer {
    if headers.is_empty() {
        return Answer::NoData(Intent::TopStatesByCount);
    }
    let states = state_counts(headers)
        .into_iter()
        .take(TOP_STATES)
        .map(|(state, count)| (state.to_string(), count))
        .collect();
    Answer::TopStates(states)
}

pub fn top_invoices_by_value(headers: &[HeaderRecord]) -> Answer {
    if headers.is_empty() {
        return Answer::NoData(Intent::TopInvoicesByValue);
    }
    let invoices = largest_invoices(headers, TOP_INVOICES)
        .into_iter()
        .map(|h| (h.issuer_name.clone(), h.total_value))
        .collect();
    Answer::TopInvoices(invoices)
}

/// Summed invoice value per issuer, descending.
pub fn supplier_totals(headers: &[HeaderRecord]) -> Vec<(&str, f64)> {
    let mut totals = group(headers, |h| h.issuer_name.as_str(), |h| h.total_value);
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// Invoice count per issuer, descending.
pub fn supplier_counts(headers: &[HeaderRecord]) -> Vec<(&str, usize)> {
    let mut counts = group(headers, |h| h.issuer_name.as_str(), |_| 1usize);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Summed quantity per product description, descending.
pub fn product_totals(items: &[ItemRecord]) -> Vec<(&str, f64)> {
    let mut totals = group(items, |i| i.description.as_str(), |i| i.quantity);
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// Invoice count per issuer state, descending.
pub fn state_counts(headers: &[HeaderRecord]) -> Vec<(&str, usize)> {
    let mut counts = group(headers, |h| h.issuer_state.as_str(), |_| 1usize);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The `n` highest-value invoices; equal values keep file order.
pub fn largest_invoices(headers: &[HeaderRecord], n: usize) -> Vec<&HeaderRecord> {
    let mut sorted: Vec<&HeaderRecord> = headers.iter().collect();
    sorted.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    sorted.truncate(n);
    sorted
}

/// Fold rows into `(key, accumulated value)` pairs in first-appearance order.
fn group<'a, T, V>(
    rows: &'a [T],
    key: impl Fn(&'a T) -> &'a str,
    value: impl Fn(&'a T) -> V,
) -> Vec<(&'a str, V)>
where
    V: AddAssign,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, V)> = Vec::new();
    for row in rows {
        let k = key(row);
        match index.get(k) {
            Some(&i) => groups[i].1 += value(row),
            None => {
                index.insert(k, groups.len());
                groups.push((k, value(row)));
            }
        }
    }
    groups
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::TopSupplier { name, amount } => write!(
                f,
                "🏆 O fornecedor com maior montante é: **{name}** com R$ {}",
                format_money(*amount)
            ),
            Answer::TopProduct { name, quantity } => write!(
                f,
                "📦 O produto mais vendido é: **{name}** com {} unidades",
                format_quantity(*quantity)
            ),
            Answer::TopStates(states) => {
                f.write_str("📍 Estados com mais emissões:")?;
                for (state, count) in states {
                    write!(f, "\n• {state}: {count} notas")?;
                }
                Ok(())
            }
            Answer::TopInvoices(invoices) => {
                write!(f, "💰 As {TOP_INVOICES} maiores notas fiscais:")?;
                for (name, value) in invoices {
                    write!(f, "\n• {name}: R$ {}", format_money(*value))?;
                }
                Ok(())
            }
            Answer::NoData(intent) => write!(
                f,
                "ℹ️ Não há dados carregados para responder a esta pergunta ({intent})."
            ),
        }
    }
}
