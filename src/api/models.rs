//! API data models

use serde::{Deserialize, Serialize};

use crate::repurpose::OutputType;

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Body of `POST /api/repurpose`
#[derive(Debug, Deserialize)]
pub struct RepurposeApiRequest {
    pub content: String,
    #[serde(rename = "outputType")]
    pub output_type: OutputType,
    pub language: String,
}

/// Body of `POST /api/tts`
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    #[serde(rename = "languageCode", default = "default_language_code")]
    pub language_code: String,
}

fn default_language_code() -> String {
    "en-IN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wrappers() {
        let ok = ApiResponse::success(1);
        assert!(ok.success);
        assert_eq!(ok.data, Some(1));

        let err = ApiResponse::<u32>::error("boom".to_string());
        assert!(!err.success);
        assert_eq!(err.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_tts_request_defaults_language() {
        let request: TtsRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(request.language_code, "en-IN");

        let request: TtsRequest =
            serde_json::from_str(r#"{"text": "hello", "languageCode": "hi-IN"}"#).unwrap();
        assert_eq!(request.language_code, "hi-IN");
    }

    #[test]
    fn test_repurpose_request_parses_camel_case() {
        let request: RepurposeApiRequest = serde_json::from_str(
            r#"{"content": "some text", "outputType": "lecture", "language": "Tamil"}"#,
        )
        .unwrap();
        assert_eq!(request.output_type, OutputType::Lecture);
    }
}
