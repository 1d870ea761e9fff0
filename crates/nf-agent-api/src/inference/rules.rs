//! Rule-based intent classifier: ordered keyword table.
//!
//! Plain substring matching on the lower-cased question, first match wins.
//! Rules overlap in vocabulary ("maior" vs "maiores"), so table order is
//! part of the contract.

use nf_protocol::{Classification, Intent};

/// One row of the classification table.
pub struct IntentRule {
    pub intent: Intent,
    /// Human-readable form of the predicate, for logs and docs.
    pub pattern: &'static str,
    predicate: fn(&str) -> bool,
}

impl IntentRule {
    /// `lower` must already be lower-cased.
    pub fn matches(&self, lower: &str) -> bool {
        (self.predicate)(lower)
    }
}

/// The classification table, in precedence order.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::TopSupplierByAmount,
        pattern: r#""maior montante" | ("fornecedor" & "maior")"#,
        predicate: top_supplier,
    },
    IntentRule {
        intent: Intent::TopProductByQuantity,
        pattern: r#""produto" & "mais vendido""#,
        predicate: top_product,
    },
    IntentRule {
        intent: Intent::TopStatesByCount,
        pattern: r#""estado" | "uf""#,
        predicate: top_states,
    },
    IntentRule {
        intent: Intent::TopInvoicesByValue,
        pattern: r#""maiores notas" | "maiores valores""#,
        predicate: top_invoices,
    },
];

fn top_supplier(q: &str) -> bool {
    q.contains("maior montante") || (q.contains("fornecedor") && q.contains("maior"))
}

fn top_product(q: &str) -> bool {
    q.contains("produto") && q.contains("mais vendido")
}

fn top_states(q: &str) -> bool {
    matches_any(q, &["estado", "uf"])
}

fn top_invoices(q: &str) -> bool {
    matches_any(q, &["maiores notas", "maiores valores"])
}

fn matches_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

/// Maps a question to zero or one known intent.
pub struct RuleBasedClassifier {
    rules: &'static [IntentRule],
}

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    pub fn rules(&self) -> &'static [IntentRule] {
        self.rules
    }

    pub fn classify(&self, question: &str) -> Classification {
        let lower = question.to_lowercase();
        self.rules
            .iter()
            .position(|rule| rule.matches(&lower))
            .map_or(Classification::NoMatch, |rule| Classification::Matched {
                intent: self.rules[rule].intent,
                rule,
            })
    }
}

impl Default for RuleBasedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Option<Intent> {
        RuleBasedClassifier::new().classify(text).intent()
    }

    // ── Rule 1: top supplier ─────────────────────────────────────

    #[test]
    fn supplier_by_amount_phrase() {
        assert_eq!(
            classify("Qual fornecedor teve maior montante recebido?"),
            Some(Intent::TopSupplierByAmount)
        );
        assert_eq!(
            classify("quem tem o MAIOR MONTANTE?"),
            Some(Intent::TopSupplierByAmount)
        );
    }

    #[test]
    fn supplier_needs_both_words_without_montante() {
        assert_eq!(
            classify("Qual o maior fornecedor?"),
            Some(Intent::TopSupplierByAmount)
        );
        assert_eq!(classify("liste os fornecedores"), None);
    }

    #[test]
    fn supplier_wins_over_invoices() {
        // "maiores" contains "maior"; rule 1 is checked first.
        assert_eq!(
            classify("maiores notas por fornecedor"),
            Some(Intent::TopSupplierByAmount)
        );
    }

    // ── Rule 2: top product ──────────────────────────────────────

    #[test]
    fn product_best_seller() {
        assert_eq!(
            classify("Qual produto foi o mais vendido?"),
            Some(Intent::TopProductByQuantity)
        );
        assert_eq!(classify("produto mais caro"), None);
    }

    // ── Rule 3: states ───────────────────────────────────────────

    #[test]
    fn states_by_keyword() {
        assert_eq!(
            classify("Quais estados emitiram mais notas?"),
            Some(Intent::TopStatesByCount)
        );
        assert_eq!(classify("notas por UF"), Some(Intent::TopStatesByCount));
    }

    #[test]
    fn states_wins_over_invoices() {
        assert_eq!(
            classify("maiores notas por estado"),
            Some(Intent::TopStatesByCount)
        );
    }

    // ── Rule 4: top invoices ─────────────────────────────────────

    #[test]
    fn top_invoices_phrases() {
        assert_eq!(
            classify("Quais as maiores notas?"),
            Some(Intent::TopInvoicesByValue)
        );
        assert_eq!(
            classify("mostre os maiores valores"),
            Some(Intent::TopInvoicesByValue)
        );
    }

    // ── No match ─────────────────────────────────────────────────

    #[test]
    fn unknown_question_has_no_intent() {
        assert_eq!(classify("Qual a média de itens por nota?"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn matched_rule_index_is_table_position() {
        let classifier = RuleBasedClassifier::new();
        assert_eq!(
            classifier.classify("maiores valores"),
            Classification::Matched {
                intent: Intent::TopInvoicesByValue,
                rule: 3,
            }
        );
        assert_eq!(classifier.rules().len(), 4);
        assert_eq!(classifier.rules()[0].intent, Intent::TopSupplierByAmount);
    }
}
