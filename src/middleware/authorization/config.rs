use serde::{Deserialize, Serialize};

pub const OBJECT_AUTHENTICATION: &str = "middlewares.authentication";
pub const DEFAULT_AUTH_HEADER: &str = "Authorization";

/// 인증 미들웨어 설정
///
/// # 설정 예시
/// ```toml
/// [middlewares.auth]
/// middleware_type = "authorization"
///
/// [middlewares.auth.settings]
/// method = "basic"
/// credentials = ["admin", "secret"]
/// regex_skip_paths = ["^/public/"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizationConfig {
    /// 인증 방식 (`bearer`, `basic`)
    #[serde(default = "default_method")]
    pub method: String,

    /// bearer 인증에 사용할 고정 토큰
    #[serde(default)]
    pub api_key: String,

    /// basic 인증에 사용할 (사용자, 비밀번호) 쌍
    #[serde(default)]
    pub credentials: Option<(String, String)>,

    /// `credentials`의 비밀번호가 bcrypt 해시인지 여부
    #[serde(default)]
    pub hashed_password: bool,

    /// 자격증명을 읽을 헤더 이름
    #[serde(default = "default_header")]
    pub header: String,

    /// 인증을 건너뛸 정적 경로
    #[serde(default = "default_skip_paths")]
    pub skip_paths: Vec<String>,

    /// 인증을 건너뛸 경로 정규식
    #[serde(default)]
    pub regex_skip_paths: Vec<String>,

    /// 거부 응답의 "object" 값
    #[serde(default = "default_object_response")]
    pub object_response: String,
}

fn default_method() -> String {
    "bearer".to_string()
}

fn default_header() -> String {
    DEFAULT_AUTH_HEADER.to_string()
}

fn default_skip_paths() -> Vec<String> {
    vec!["/ping".to_string()]
}

fn default_object_response() -> String {
    OBJECT_AUTHENTICATION.to_string()
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            api_key: String::new(),
            credentials: None,
            hashed_password: false,
            header: default_header(),
            skip_paths: default_skip_paths(),
            regex_skip_paths: Vec::new(),
            object_response: default_object_response(),
        }
    }
}

impl AuthorizationConfig {
    pub fn bearer(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: "basic".to_string(),
            credentials: Some((user.into(), password.into())),
            ..Default::default()
        }
    }

    /// 비어 있는 값에 기본값을 채웁니다.
    pub(crate) fn normalized(mut self) -> Self {
        if self.header.is_empty() {
            self.header = default_header();
        }
        if self.object_response.is_empty() {
            self.object_response = default_object_response();
        }
        self
    }
}
