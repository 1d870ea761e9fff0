//! HTTP request/response bodies for the query API.

use serde::{Deserialize, Serialize};

use crate::intent::AnswerTier;

/// Body of `POST /api/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Missing and blank questions are both rejected with 400.
    #[serde(default)]
    pub question: Option<String>,
}

/// Successful body of `POST /api/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Always `"success"` for this body.
    pub status: String,
    pub response: String,
    /// The question as processed (trimmed).
    pub question: String,
    pub tier: AnswerTier,
    /// Raw error text for operators when the answer is an error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_missing_question() {
        let req: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.question.is_none());
    }

    #[test]
    fn query_response_omits_empty_diagnostic() {
        let resp = QueryResponse {
            status: "success".into(),
            response: "ok".into(),
            question: "qual o maior montante?".into(),
            tier: AnswerTier::Rules,
            diagnostic: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""tier":"rules""#));
        assert!(!json.contains("diagnostic"));
    }
}
