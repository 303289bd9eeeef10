//! JSON shapes exchanged with callers of the relay.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /analyze`.
///
/// `imageUrl` is kept as raw JSON: whatever the caller sent (or nothing) is forwarded
/// upstream as-is and any resulting upstream error goes through the normal failure path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub image_url: Option<Value>,
}

/// Body of `POST /advice`. Fields are raw JSON and are rendered into the prompt text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    #[serde(default)]
    pub image_url: Option<Value>,
    #[serde(default)]
    pub strategy: Option<Value>,
    /// Accepted for compatibility; not used when building the prompt.
    #[serde(default)]
    pub timeframes: Option<Value>,
    #[serde(default)]
    pub additional_parameter: Option<Value>,
    #[serde(default)]
    pub extracted_timeframe: Option<Value>,
}

/// Decodes a request body leniently.
///
/// A body not declared as JSON, an empty body, or a JSON value that is not an object
/// all decode to `T::default()`. Only a declared JSON body that fails to parse is an error.
pub fn decode_body<T>(declared_json: bool, body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if !declared_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    match serde_json::from_slice::<Value>(body)? {
        obj @ Value::Object(_) => serde_json::from_value(obj),
        _ => Ok(T::default()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// `"true"` or `"false"`; callers expect a string, not a JSON boolean.
    pub is_chart: String,
    pub timeframe: String,
}

impl AnalysisResult {
    pub fn new(is_chart: bool, timeframe: impl Into<String>) -> Self {
        Self {
            is_chart: is_chart.to_string(),
            timeframe: timeframe.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResult {
    pub advice: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn advice_request_reads_camel_case_keys() {
        let req: AdviceRequest = serde_json::from_value(json!({
            "imageUrl": "https://img.example/chart.png",
            "strategy": "breakout",
            "timeframes": "1h,4h",
            "additionalParameter": "high volatility",
            "extractedTimeframe": "hours",
        }))
        .unwrap();
        assert_eq!(req.image_url, Some(json!("https://img.example/chart.png")));
        assert_eq!(req.strategy, Some(json!("breakout")));
        assert_eq!(req.additional_parameter, Some(json!("high volatility")));
        assert_eq!(req.extracted_timeframe, Some(json!("hours")));
    }

    #[test]
    fn analysis_request_tolerates_missing_image_url() {
        let req: AnalysisRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.image_url.is_none());
    }

    #[test]
    fn decode_keeps_non_string_values() {
        let req: AnalysisRequest = decode_body(true, br#"{"imageUrl": 12345}"#).unwrap();
        assert_eq!(req.image_url, Some(json!(12345)));
    }

    #[test]
    fn decode_undeclared_or_empty_body_is_default() {
        let req: AnalysisRequest =
            decode_body(false, br#"{"imageUrl": "https://img.example/chart.png"}"#).unwrap();
        assert!(req.image_url.is_none());

        let req: AdviceRequest = decode_body(true, b"  ").unwrap();
        assert!(req.strategy.is_none());
    }

    #[test]
    fn decode_non_object_json_is_default() {
        let req: AnalysisRequest = decode_body(true, b"[1, 2, 3]").unwrap();
        assert!(req.image_url.is_none());
    }

    #[test]
    fn decode_rejects_declared_json_that_does_not_parse() {
        assert!(decode_body::<AnalysisRequest>(true, b"{not json").is_err());
    }

    #[test]
    fn analysis_result_serializes_is_chart_as_string() {
        let value = serde_json::to_value(AnalysisResult::new(true, "minutes")).unwrap();
        assert_eq!(value, json!({"isChart": "true", "timeframe": "minutes"}));
    }
}
