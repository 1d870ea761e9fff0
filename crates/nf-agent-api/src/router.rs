//! Query router: rule table first, text generation on a miss.
//!
//! Every outcome is a displayable string; failures become an answer that
//! starts with `ERROR_MARKER` plus a `diagnostic` carrying the raw error.

use std::sync::Arc;

use nf_protocol::{AnswerTier, Classification};
use nf_tabular::{TabularStore, aggregate};

use crate::inference::{FallbackContext, FallbackError, RuleBasedClassifier, TextGenerator};

/// Answer returned while no dataset is loaded.
pub const NOT_READY_MESSAGE: &str =
    "Agente não está pronto ainda. Aguarde o carregamento dos dados.";

/// Prefix of every error answer.
pub const ERROR_MARKER: &str = "❌";

/// Result of routing one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub answer: String,
    pub tier: AnswerTier,
    /// Raw error text when `tier` is `Error`.
    pub diagnostic: Option<String>,
}

impl QueryOutcome {
    pub fn not_ready() -> Self {
        Self {
            answer: NOT_READY_MESSAGE.to_string(),
            tier: AnswerTier::NotReady,
            diagnostic: None,
        }
    }

    fn answered(answer: String, tier: AnswerTier) -> Self {
        Self {
            answer,
            tier,
            diagnostic: None,
        }
    }

    fn failed(err: &FallbackError) -> Self {
        Self {
            answer: format!(
                "{ERROR_MARKER} Erro ao processar pergunta: {}",
                err.user_message()
            ),
            tier: AnswerTier::Error,
            diagnostic: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.tier == AnswerTier::Error
    }
}

/// Classifier, aggregation and fallback composed behind one call.
pub struct QueryRouter {
    classifier: RuleBasedClassifier,
    fallback: Arc<dyn TextGenerator>,
}

impl QueryRouter {
    pub fn new(fallback: Arc<dyn TextGenerator>) -> Self {
        Self {
            classifier: RuleBasedClassifier::new(),
            fallback,
        }
    }

    pub fn fallback_name(&self) -> &str {
        self.fallback.name()
    }

    /// Route `question` against `store`; `None` means not ready.
    ///
    /// Rule matches never reach the fallback. Unmatched questions reach it
    /// exactly once, trimmed but otherwise as typed.
    pub async fn query(&self, store: Option<&TabularStore>, question: &str) -> QueryOutcome {
        let Some(store) = store else {
            return QueryOutcome::not_ready();
        };
        let question = question.trim();

        match self.classifier.classify(question) {
            Classification::Matched { intent, rule } => {
                tracing::debug!(intent = %intent, rule, "rule matched");
                let answer = aggregate::answer(store, intent);
                QueryOutcome::answered(answer.to_string(), AnswerTier::Rules)
            }
            Classification::NoMatch => {
                tracing::debug!(fallback = self.fallback.name(), "no rule matched, using fallback");
                let context = FallbackContext::from_store(store);
                match self.fallback.generate(question, &context).await {
                    Ok(text) if !text.trim().is_empty() => {
                        QueryOutcome::answered(text.trim().to_string(), AnswerTier::Fallback)
                    }
                    Ok(_) => QueryOutcome::failed(&FallbackError::EmptyResponse),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            fallback = self.fallback.name(),
                            "fallback failed"
                        );
                        QueryOutcome::failed(&e)
                    }
                }
            }
        }
    }
}
