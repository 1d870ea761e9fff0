//! Scripted text generator for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{FallbackContext, FallbackError, TextGenerator};

/// Returns a fixed reply (or error) and records every question it receives.
pub struct MockGenerator {
    reply: Result<String, FallbackError>,
    calls: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: FallbackError) -> Self {
        Self {
            reply: Err(err),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Questions received so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        question: &str,
        _context: &FallbackContext,
    ) -> Result<String, FallbackError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(question.to_string());
        self.reply.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
