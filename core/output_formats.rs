use crate::bundler::Bundle;
use crate::error::{AppError, Result};
#[cfg(feature = "serde_support")]
use chrono::{DateTime, Utc};
#[cfg(feature = "serde_support")]
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "camelCase"))]
pub struct BundleReport {
    pub content: String,
    pub token_count: i64,
    #[cfg_attr(
        feature = "serde_support",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub token_error: Option<String>,
    pub model: String,
    #[cfg_attr(
        feature = "serde_support",
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub module_name: Option<String>,
    pub file_count: usize,
    pub files: Vec<String>,
    #[cfg(feature = "serde_support")]
    pub generated_at: DateTime<Utc>,
}

impl BundleReport {
    pub fn from_bundle(bundle: &Bundle, model: &str) -> Self {
        Self {
            content: bundle.content.clone(),
            token_count: bundle.token_count(),
            token_error: bundle.token_error().map(|e| e.to_string()),
            model: model.to_string(),
            module_name: bundle.module_name.clone(),
            file_count: bundle.files.len(),
            files: bundle.paths().map(String::from).collect(),
            #[cfg(feature = "serde_support")]
            generated_at: Utc::now(),
        }
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, AppError> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(AppError::JsonSerialize)
    } else {
        serde_json::to_string(value).map_err(AppError::JsonSerialize)
    }
}

#[cfg(feature = "serde_support")]
pub fn serialize_to_yaml<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_yml::to_string(value).map_err(AppError::YamlError)
}

#[cfg(all(test, feature = "serde_support"))]
mod tests {
    use super::*;
    use crate::gather::FileRecord;

    fn bundle(tokens: Result<usize>) -> Bundle {
        Bundle {
            content: "// Start File: a.go\n\npackage a\n\n// End File: a.go\n\n".to_string(),
            files: vec![FileRecord {
                path: "a.go".to_string(),
                content: "package a".to_string(),
                package_name: "a".to_string(),
                internal_imports: Vec::new(),
            }],
            module_name: Some("example.com/app".to_string()),
            tokens,
        }
    }

    #[test]
    fn json_uses_camel_case_api_fields() {
        let report = BundleReport::from_bundle(&bundle(Ok(12)), "gpt-4o");
        let value: serde_json::Value =
            serde_json::from_str(&serialize_to_json(&report, false).unwrap()).unwrap();
        assert_eq!(value["tokenCount"], 12);
        assert_eq!(value["fileCount"], 1);
        assert_eq!(value["files"][0], "a.go");
        assert_eq!(value["moduleName"], "example.com/app");
        assert!(value.get("tokenError").is_none());
        assert!(value["content"].as_str().unwrap().contains("package a"));
        assert!(value.get("generatedAt").is_some());
    }

    #[test]
    fn failed_count_is_reported_with_sentinel() {
        let report = BundleReport::from_bundle(
            &bundle(Err(AppError::TikToken("boom".to_string()))),
            "gpt-4o",
        );
        assert_eq!(report.token_count, -1);
        assert!(report.token_error.as_deref().unwrap().contains("boom"));
        let yaml = serialize_to_yaml(&report).unwrap();
        assert!(yaml.contains("tokenCount: -1"));
    }
}
