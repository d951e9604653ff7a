use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 접근 로그 미들웨어 설정
///
/// `fields`는 출력 필드 이름과 태그의 매핑입니다.
///
/// # 지원 태그
/// - `@id` (X-Request-ID)
/// - `@remote_ip`
/// - `@uri`
/// - `@host`
/// - `@method`
/// - `@path`
/// - `@referer`
/// - `@user_agent`
/// - `@status`
/// - `@latency` (나노초)
/// - `@latency_human`
/// - `@bytes_in`
/// - `@bytes_out`
/// - `@header:<NAME>`
/// - `@query:<NAME>`
/// - `@form:<NAME>`
/// - `@cookie:<NAME>`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessLogConfig {
    #[serde(default = "default_fields")]
    pub fields: HashMap<String, String>,

    /// 로그를 남기지 않을 정적 경로
    #[serde(default)]
    pub skip_paths: Vec<String>,

    /// 로그를 남기지 않을 경로 정규식
    #[serde(default)]
    pub regex_skip_paths: Vec<String>,
}

fn default_fields() -> HashMap<String, String> {
    [
        ("id", "@id"),
        ("remote_ip", "@remote_ip"),
        ("uri", "@uri"),
        ("host", "@host"),
        ("method", "@method"),
        ("status", "@status"),
        ("latency", "@latency"),
    ]
    .into_iter()
    .map(|(field, tag)| (field.to_string(), tag.to_string()))
    .collect()
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            skip_paths: Vec::new(),
            regex_skip_paths: Vec::new(),
        }
    }
}
