use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 미들웨어 종류
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MiddlewareType {
    Authorization,
    Cors,
    SwaggerValidator,
    AccessLog,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiddlewareConfig {
    /// 미들웨어 타입
    pub middleware_type: MiddlewareType,

    /// 미들웨어 활성화 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 실행 순서 (낮은 숫자가 먼저 실행)
    #[serde(default)]
    pub order: i32,

    /// 미들웨어별 설정
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Deserialize)]
struct MiddlewaresSection {
    #[serde(default)]
    middlewares: HashMap<String, MiddlewareConfig>,
}

impl MiddlewareConfig {
    /// TOML 설정에서 미들웨어 설정을 파싱합니다.
    pub fn from_toml(config: &str) -> Result<HashMap<String, Self>, toml::de::Error> {
        let config: MiddlewaresSection = toml::from_str(config)?;
        Ok(config.middlewares)
    }

    /// YAML 설정에서 미들웨어 설정을 파싱합니다.
    pub fn from_yaml(config: &str) -> Result<HashMap<String, Self>, serde_yaml::Error> {
        let config: MiddlewaresSection = serde_yaml::from_str(config)?;
        Ok(config.middlewares)
    }
}
