use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::catalog::ErrorCode;
use crate::error::{FrgCheckError, Result};

/// The per-(row, error code) judgment returned by the evaluator.
///
/// Pipeline failures (configuration misses, transport errors, unparseable
/// replies) are recorded as error-positive verdicts of the same shape, so a
/// failed check is never silently absent from the aggregated output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    #[schemars(description = "The evaluated error code (e.g. \"1001\")")]
    pub error_id: String,

    #[schemars(description = "True when the error pattern is actually present in the input")]
    pub is_error_found: bool,

    #[schemars(
        description = "Concrete reasoning for the judgment; '問題なし' when no error was found"
    )]
    pub reason: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(description = "Improvement proposal when an error was found; empty otherwise")]
    pub suggestion: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Raw model output, retained only when the verdict records a pipeline failure"
    )]
    pub raw_output: Option<String>,
}

// The output contract allows `"suggestion": null` as well as "".
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl Verdict {
    /// An error-positive verdict recording a pipeline failure rather than a
    /// genuine LLM judgment.
    pub fn failure(
        code: ErrorCode,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            error_id: code.as_str().to_string(),
            is_error_found: true,
            reason: reason.into(),
            suggestion: suggestion.into(),
            raw_output: None,
        }
    }

    /// Like [`Verdict::failure`], keeping the raw reply for diagnosis.
    pub fn failure_with_raw(
        code: ErrorCode,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            raw_output: Some(raw.into()),
            ..Self::failure(code, reason, suggestion)
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Verdict)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

/// Parses a model reply as the four-key verdict object, backfilling
/// `error_id` when the model omitted it.
pub fn parse_verdict(raw: &str, code: ErrorCode) -> Result<Verdict> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FrgCheckError::EmptyReply);
    }

    let mut value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| FrgCheckError::VerdictParse {
            message: e.to_string(),
            raw: raw.to_string(),
        })?;

    if let Some(object) = value.as_object_mut() {
        let missing_id = object.get("error_id").map_or(true, |id| id.is_null());
        if missing_id {
            object.insert("error_id".to_string(), json!(code.as_str()));
        }
    }

    serde_json::from_value(value).map_err(|e| FrgCheckError::VerdictParse {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_verdict() {
        let raw = r#"{"error_id":"2201","is_error_found":false,"reason":"問題なし","suggestion":""}"#;
        let verdict = parse_verdict(raw, ErrorCode::E2201).unwrap();
        assert_eq!(verdict.error_id, "2201");
        assert!(!verdict.is_error_found);
        assert_eq!(verdict.reason, "問題なし");
        assert_eq!(verdict.suggestion, "");
        assert!(verdict.raw_output.is_none());
    }

    #[test]
    fn test_parse_backfills_error_id() {
        let raw = r#"{"is_error_found":true,"reason":"矛盾あり","suggestion":"修正してください"}"#;
        let verdict = parse_verdict(raw, ErrorCode::E2101).unwrap();
        assert_eq!(verdict.error_id, "2101");
        assert!(verdict.is_error_found);
    }

    #[test]
    fn test_parse_accepts_null_suggestion() {
        let raw = r#"{"error_id":"1001","is_error_found":false,"reason":"問題なし","suggestion":null}"#;
        let verdict = parse_verdict(raw, ErrorCode::E1001).unwrap();
        assert_eq!(verdict.suggestion, "");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_verdict("not json at all", ErrorCode::E1001).unwrap_err();
        match err {
            FrgCheckError::VerdictParse { raw, .. } => assert_eq!(raw, "not json at all"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_reply() {
        assert!(matches!(
            parse_verdict("   ", ErrorCode::E1001),
            Err(FrgCheckError::EmptyReply)
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let verdict = Verdict {
            error_id: "2206".to_string(),
            is_error_found: true,
            reason: "Capability と Requirements が整合していない".to_string(),
            suggestion: "処理速度の記述を揃えてください".to_string(),
            raw_output: None,
        };
        let json = serde_json::to_string(&verdict).unwrap();
        // raw_output must not appear on genuine judgments.
        assert!(!json.contains("raw_output"));

        let reparsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed.error_id, verdict.error_id);
        assert_eq!(reparsed.is_error_found, verdict.is_error_found);
        assert_eq!(reparsed.reason, verdict.reason);
        assert_eq!(reparsed.suggestion, verdict.suggestion);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = Verdict::schema_as_json().unwrap();
        assert!(schema_json.contains("error_id"));
        assert!(schema_json.contains("is_error_found"));
        assert!(schema_json.contains("reason"));
        assert!(schema_json.contains("suggestion"));
    }
}
