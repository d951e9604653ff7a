
/// 미들웨어 생성 및 실행 중 발생하는 내부 오류
///
/// 인증 실패나 스키마 검증 실패는 오류가 아니라 거부 응답으로 처리됩니다.
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("미들웨어 {middleware} 설정 오류: {message}")]
    Config {
        middleware: String,
        message: String,
    },

    #[error("잘못된 경로 정규식 '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("처리 오류: {0}")]
    Processing(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl MiddlewareError {
    pub fn config(middleware: &str, message: impl Into<String>) -> Self {
        Self::Config {
            middleware: middleware.to_string(),
            message: message.into(),
        }
    }
}
