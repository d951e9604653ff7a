use serde::{Deserialize, Serialize};

pub const OBJECT_SWAGGER_VALIDATOR: &str = "middlewares.swaggerValidator";
pub const DEFAULT_DOCUMENT: &str = "spec.yml";

/// 스키마 검증 미들웨어 설정
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwaggerValidatorConfig {
    /// 검증을 건너뛸 정적 경로
    #[serde(default)]
    pub skip_paths: Vec<String>,

    /// 검증을 건너뛸 경로 정규식
    #[serde(default)]
    pub regex_skip_paths: Vec<String>,

    /// 거부 응답의 "object" 값
    #[serde(default = "default_object_response")]
    pub object_response: String,

    /// OpenAPI/Swagger 문서 경로
    #[serde(default = "default_document")]
    pub document: String,
}

fn default_object_response() -> String {
    OBJECT_SWAGGER_VALIDATOR.to_string()
}

fn default_document() -> String {
    DEFAULT_DOCUMENT.to_string()
}

impl Default for SwaggerValidatorConfig {
    fn default() -> Self {
        Self {
            skip_paths: Vec::new(),
            regex_skip_paths: Vec::new(),
            object_response: default_object_response(),
            document: default_document(),
        }
    }
}

impl SwaggerValidatorConfig {
    pub(crate) fn normalized(mut self) -> Self {
        if self.object_response.is_empty() {
            self.object_response = default_object_response();
        }
        if self.document.is_empty() {
            self.document = default_document();
        }
        self
    }
}
