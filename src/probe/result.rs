// src/probe/result.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProbeStatus {
    Up,
    Down,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Up => "UP",
            ProbeStatus::Down => "DOWN",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one probe. Never mutated after the prober builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub url: String,
    pub status: ProbeStatus,
    #[serde(rename = "responseTime", alias = "responseTimeMs")]
    pub response_time_ms: u64,
    pub status_code: Option<u16>,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl ProbeResult {
    /// A completed HTTP exchange that returned `status_code`.
    pub fn completed(url: impl Into<String>, status_code: u16, response_time_ms: u64) -> Self {
        let status = if (200..400).contains(&status_code) {
            ProbeStatus::Up
        } else {
            ProbeStatus::Down
        };

        Self {
            url: url.into(),
            status,
            response_time_ms,
            status_code: Some(status_code),
            timestamp: Utc::now(),
            error: None,
        }
    }

    /// A probe that never produced an acceptable response.
    pub fn failed(url: impl Into<String>, error: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            url: url.into(),
            status: ProbeStatus::Down,
            response_time_ms,
            status_code: None,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == ProbeStatus::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status_code() {
        assert!(ProbeResult::completed("https://a.test", 200, 5).is_up());
        assert!(ProbeResult::completed("https://a.test", 304, 5).is_up());
        assert!(!ProbeResult::completed("https://a.test", 404, 5).is_up());
        assert!(!ProbeResult::completed("https://a.test", 199, 5).is_up());
    }

    #[test]
    fn failed_result_has_no_status_code() {
        let result = ProbeResult::failed("https://a.test", "timeout", 10_000);
        assert_eq!(result.status, ProbeStatus::Down);
        assert_eq!(result.status_code, None);
        assert_eq!(result.error.as_deref(), Some("timeout"));
        assert_eq!(result.response_time_ms, 10_000);
    }

    #[test]
    fn json_shape_uses_camel_case_keys() {
        let result = ProbeResult::completed("https://a.test", 200, 120);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["status"], "UP");
        assert_eq!(value["responseTime"], 120);
        assert_eq!(value["statusCode"], 200);
        assert!(value["error"].is_null());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn reads_records_written_with_either_latency_key() {
        let legacy = r#"{"url":"https://a.test","status":"DOWN","responseTime":7,
            "statusCode":null,"timestamp":"2024-05-01T10:00:00.000Z","error":"boom"}"#;
        let explicit = r#"{"url":"https://a.test","status":"UP","responseTimeMs":9,
            "statusCode":200,"timestamp":"2024-05-01T10:05:00Z","error":null}"#;

        let legacy: ProbeResult = serde_json::from_str(legacy).unwrap();
        let explicit: ProbeResult = serde_json::from_str(explicit).unwrap();

        assert_eq!(legacy.response_time_ms, 7);
        assert_eq!(legacy.status, ProbeStatus::Down);
        assert_eq!(explicit.response_time_ms, 9);
        assert_eq!(explicit.status_code, Some(200));
    }
}
