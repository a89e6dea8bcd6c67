//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Response types are deliberately lenient: every level is optional so that a
//! reply missing candidates, content or parts still decodes and is treated as
//! "no reply" rather than as a decode failure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

impl GenerateContentRequest {
    /// A single-turn request whose only payload is `text`.
    pub fn from_prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: text.into() }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, or `None` when any level is
    /// missing or the text is empty.
    pub fn reply_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).expect("response should decode")
    }

    #[test]
    fn request_body_matches_expected_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "contents": [ { "parts": [ { "text": "hello" } ] } ] })
        );
    }

    #[test]
    fn reply_text_reads_first_candidate_first_part() {
        let response = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"hi there"},{"text":"ignored"}]}},
                {"content":{"parts":[{"text":"second candidate"}]}}
            ]}"#,
        );
        assert_eq!(response.reply_text().as_deref(), Some("hi there"));
    }

    #[test]
    fn missing_levels_yield_no_reply() {
        let cases = [
            "{}",
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
        ];

        for raw in cases {
            assert_eq!(parse(raw).reply_text(), None, "case: {raw}");
        }
    }

    #[test]
    fn unrelated_fields_are_ignored() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"}],"role":"model"},"finishReason":"STOP"}],
                "usageMetadata":{"totalTokenCount":3}}"#,
        );
        assert_eq!(response.reply_text().as_deref(), Some("ok"));
    }
}
