use career_eval_core::{Evaluation, SessionId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /evaluate`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// Questionnaire answers, forwarded to the model as-is
    #[schema(value_type = Option<Object>)]
    pub answers: Option<Value>,

    /// Used when the `X-Session-ID` header is absent. Numbers and booleans
    /// are taken as their text; other non-string values are ignored.
    #[serde(default, deserialize_with = "lenient_session_id")]
    pub session_id: Option<String>,
}

fn lenient_session_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        Value::Bool(id) => Some(id.to_string()),
        _ => None,
    })
}

impl EvaluateRequest {
    /// Parse a raw request body; an empty body is an empty request.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    /// Risk score from 0 to 100, higher means more risk
    pub score: u8,
    pub explanation: String,
    pub session_id: SessionId,
}

impl From<Evaluation> for EvaluateResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            score: evaluation.result.score,
            explanation: evaluation.result.explanation,
            session_id: evaluation.session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_empty_request() {
        let request = EvaluateRequest::from_body(b"").unwrap();
        assert!(request.answers.is_none());
        assert!(request.session_id.is_none());

        let request = EvaluateRequest::from_body(b"  \n").unwrap();
        assert!(request.answers.is_none());
    }

    #[test]
    fn test_camel_case_body() {
        let request =
            EvaluateRequest::from_body(br#"{"answers": {"role": "Nurse"}, "sessionId": "abc"}"#)
                .unwrap();
        assert_eq!(request.answers, Some(json!({"role": "Nurse"})));
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_null_answers_deserialize_as_none() {
        let request = EvaluateRequest::from_body(br#"{"answers": null}"#).unwrap();
        assert!(request.answers.is_none());
    }

    #[test]
    fn test_non_string_session_id() {
        let request =
            EvaluateRequest::from_body(br#"{"answers": {"role": "Nurse"}, "sessionId": 5}"#)
                .unwrap();
        assert_eq!(request.session_id.as_deref(), Some("5"));
        assert!(request.answers.is_some());

        let request =
            EvaluateRequest::from_body(br#"{"answers": {}, "sessionId": {"id": 1}}"#).unwrap();
        assert!(request.session_id.is_none());

        let request = EvaluateRequest::from_body(br#"{"answers": {}, "sessionId": null}"#).unwrap();
        assert!(request.session_id.is_none());
    }

    #[test]
    fn test_malformed_body() {
        assert!(EvaluateRequest::from_body(b"{not json").is_err());
    }
}
