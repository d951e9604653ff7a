use serde::{Deserialize, Serialize};

/// 기본 허용 헤더 목록
pub const DEFAULT_CORS_HEADERS: &[&str] = &[
    "Authentication",
    "Content-Type",
    "Origin",
    "Accept",
    "Cache-Control",
    "Postman-Token",
    "User-Agent",
    "Host",
    "Accept-Encoding",
    "Connection",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorsConfig {
    /// CORS 헤더를 설정하지 않을 정적 경로
    #[serde(default)]
    pub skip_paths: Vec<String>,

    /// CORS 헤더를 설정하지 않을 경로 정규식
    #[serde(default)]
    pub regex_skip_paths: Vec<String>,

    /// 허용할 Origin 목록
    #[serde(default = "default_origins")]
    pub allow_origins: Vec<String>,

    /// 허용할 HTTP 메서드 목록
    #[serde(default = "default_methods")]
    pub allow_methods: Vec<String>,

    /// 허용할 헤더 목록
    #[serde(default = "default_headers")]
    pub allow_headers: Vec<String>,

    /// credentials 허용 여부
    #[serde(default = "default_allow_credentials")]
    pub allow_credentials: bool,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_methods() -> Vec<String> {
    vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_headers() -> Vec<String> {
    DEFAULT_CORS_HEADERS.iter().map(|h| h.to_string()).collect()
}

fn default_allow_credentials() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            skip_paths: Vec::new(),
            regex_skip_paths: Vec::new(),
            allow_origins: default_origins(),
            allow_methods: default_methods(),
            allow_headers: default_headers(),
            allow_credentials: default_allow_credentials(),
        }
    }
}

impl CorsConfig {
    /// 비어 있는 목록을 기본값으로 채웁니다.
    pub(crate) fn normalized(mut self) -> Self {
        if self.allow_origins.is_empty() {
            self.allow_origins = default_origins();
        }
        if self.allow_methods.is_empty() {
            self.allow_methods = default_methods();
        }
        if self.allow_headers.is_empty() {
            self.allow_headers = default_headers();
        }
        self
    }
}
