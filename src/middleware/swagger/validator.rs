use hyper::http::request::Parts;

/// 스키마 검증 실패
///
/// 메시지는 400 응답 본문의 "error" 값으로 그대로 사용됩니다.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct SchemaError {
    message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 요청 스키마 검증기
///
/// 미들웨어는 검증 결과에 따라 통과/거부만 결정하며
/// 검증 방식은 구현체에 맡깁니다.
pub trait RequestValidator: Send + Sync {
    fn validate(&self, parts: &Parts, body: &[u8]) -> Result<(), SchemaError>;
}
