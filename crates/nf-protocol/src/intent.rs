use serde::{Deserialize, Serialize};

/// Question categories answered directly from the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Issuer with the largest summed invoice value.
    TopSupplierByAmount,
    /// Product with the largest summed quantity.
    TopProductByQuantity,
    /// Top 5 issuer states by invoice count.
    TopStatesByCount,
    /// Top 10 invoices by total value.
    TopInvoicesByValue,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::TopSupplierByAmount => "top_supplier_by_amount",
            Intent::TopProductByQuantity => "top_product_by_quantity",
            Intent::TopStatesByCount => "top_states_by_count",
            Intent::TopInvoicesByValue => "top_invoices_by_value",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a question against the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A rule matched; `rule` is its position in the table.
    Matched { intent: Intent, rule: usize },
    /// No rule matched; the question goes to the fallback.
    NoMatch,
}

impl Classification {
    pub fn intent(&self) -> Option<Intent> {
        match self {
            Classification::Matched { intent, .. } => Some(*intent),
            Classification::NoMatch => None,
        }
    }
}

/// Which path produced a query answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerTier {
    /// Deterministic aggregation over the loaded tables.
    Rules,
    /// External text-generation service.
    Fallback,
    /// Dataset not loaded yet.
    NotReady,
    /// Routing failed; the answer is an error message.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serialization_matches_as_str() {
        for intent in [
            Intent::TopSupplierByAmount,
            Intent::TopProductByQuantity,
            Intent::TopStatesByCount,
            Intent::TopInvoicesByValue,
        ] {
            let json = serde_json::to_string(&intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }

    #[test]
    fn classification_intent_accessor() {
        let hit = Classification::Matched {
            intent: Intent::TopStatesByCount,
            rule: 2,
        };
        assert_eq!(hit.intent(), Some(Intent::TopStatesByCount));
        assert_eq!(Classification::NoMatch.intent(), None);
    }

    #[test]
    fn answer_tier_serialization() {
        assert_eq!(
            serde_json::to_string(&AnswerTier::NotReady).unwrap(),
            r#""not_ready""#
        );
        assert_eq!(
            serde_json::to_string(&AnswerTier::Fallback).unwrap(),
            r#""fallback""#
        );
    }
}
