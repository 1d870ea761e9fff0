//! Question answering tiers.
//!
//! Questions are classified by a local rule table first; anything it can't
//! match goes to a text-generation service with the dataset attached.
//!
//! - **Rules** (`rules`): keyword table, answered by deterministic
//!   aggregation over the loaded tables.
//! - **Gemini** (`gemini`): Google generative language API, used for
//!   free-form questions.

pub mod gemini;
pub mod mock;
pub mod rules;

use std::sync::Arc;

use async_trait::async_trait;
use nf_tabular::TabularStore;

pub use gemini::{ContextMode, GeminiConfig, GeminiGenerator};
pub use mock::MockGenerator;
pub use rules::RuleBasedClassifier;

/// A file handed to the text-generation service alongside the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: &'static str,
    pub data: Arc<[u8]>,
}

/// Dataset context for one fallback call, taken from a single store snapshot.
///
/// Attachments are the bytes the snapshot was parsed from, never a fresh
/// read of the extraction directory.
#[derive(Debug, Clone)]
pub struct FallbackContext {
    /// Plain-text overview (totals and rankings), cached per store.
    pub summary: Arc<str>,
    /// The header and item CSV files the store was loaded from.
    pub attachments: Vec<Attachment>,
}

impl FallbackContext {
    pub fn from_store(store: &TabularStore) -> Self {
        Self {
            summary: store.context_text(),
            attachments: store
                .source_files()
                .iter()
                .map(|file| Attachment {
                    name: file.file_name(),
                    mime_type: "text/csv",
                    data: file.bytes.clone(),
                })
                .collect(),
        }
    }
}

/// Errors from the text-generation tier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    #[error("text generation is not configured (no API key)")]
    Disabled,

    #[error("no dataset files to attach")]
    NoAttachments,

    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("model returned an empty response")]
    EmptyResponse,
}

impl FallbackError {
    /// Short Portuguese message shown to the user; the full error goes to logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            FallbackError::Disabled => "o serviço de IA não está configurado",
            FallbackError::Timeout(_) => "o serviço de IA demorou demais para responder",
            FallbackError::EmptyResponse => "o serviço de IA retornou uma resposta vazia",
            FallbackError::NoAttachments => "não foi possível ler os arquivos de dados",
            FallbackError::Request(_) | FallbackError::Status { .. } | FallbackError::Decode(_) => {
                "falha ao consultar o serviço de IA"
            }
        }
    }
}

/// Trait for services that answer free-form questions about the dataset.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Answer `question` using `context`. Called at most once per question.
    async fn generate(
        &self,
        question: &str,
        context: &FallbackContext,
    ) -> Result<String, FallbackError>;

    /// Name of this tier (for logging).
    fn name(&self) -> &str;
}

/// Generator used when no API key is configured.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _question: &str,
        _context: &FallbackContext,
    ) -> Result<String, FallbackError> {
        Err(FallbackError::Disabled)
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_tabular::mock;

    #[test]
    fn context_attaches_both_source_files() {
        let context = FallbackContext::from_store(&mock::sample_store());
        let names: Vec<&str> = context.attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, [mock::SAMPLE_HEADER_FILE, mock::SAMPLE_ITEM_FILE]);
        assert!(context.attachments.iter().all(|a| a.mime_type == "text/csv"));
        assert_eq!(&*context.attachments[1].data, mock::SAMPLE_ITEM_CSV.as_bytes());
        assert!(context.summary.starts_with("DADOS DAS NOTAS FISCAIS:"));
    }

    #[test]
    fn contexts_share_the_store_summary() {
        let store = mock::sample_store();
        let first = FallbackContext::from_store(&store);
        let second = FallbackContext::from_store(&store);
        assert!(Arc::ptr_eq(&first.summary, &second.summary));
        assert!(Arc::ptr_eq(&first.attachments[0].data, &second.attachments[0].data));
    }

    #[test]
    fn context_of_file_backed_store_ignores_later_disk_changes() {
        let dir = tempfile::tempdir().unwrap();
        let origin = mock::write_sample_csvs(dir.path()).unwrap();
        let store = TabularStore::load(
            &origin.header_path,
            &origin.item_path,
            nf_tabular::Delimiter::Comma,
        )
        .unwrap();
        std::fs::write(&origin.header_path, "CHAVE DE ACESSO\nNF-X\n").unwrap();

        let context = FallbackContext::from_store(&store);
        assert_eq!(&*context.attachments[0].data, mock::SAMPLE_HEADER_CSV.as_bytes());
    }

    #[tokio::test]
    async fn disabled_generator_always_fails() {
        let context = FallbackContext::from_store(&mock::sample_store());
        let err = DisabledGenerator
            .generate("qualquer coisa", &context)
            .await
            .unwrap_err();
        assert_eq!(err, FallbackError::Disabled);
        assert_eq!(DisabledGenerator.name(), "disabled");
    }

    #[test]
    fn user_messages_hide_details() {
        let err = FallbackError::Status {
            status: 500,
            body: "stack trace".into(),
        };
        assert!(!err.user_message().contains("stack"));
        assert!(err.to_string().contains("stack trace"));
    }
}
