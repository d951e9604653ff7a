use async_trait::async_trait;
use hyper::header::HeaderName;
use hyper::StatusCode;
use tracing::{debug, warn};

use crate::middleware::{
    rejection, Middleware, MiddlewareError, Next, PathMatcher, Request, Response,
};
use super::config::AuthorizationConfig;
use super::strategy::{AuthFailure, AuthStrategy, AuthValidator};

const NAME: &str = "authorization";

/// 인증 미들웨어
///
/// 예외 경로가 아니면 설정된 전략으로 헤더를 검증하고,
/// 실패 시 403 응답으로 체인을 중단합니다.
#[derive(Debug)]
pub struct AuthorizationMiddleware {
    header: HeaderName,
    object_response: String,
    skip: PathMatcher,
    strategy: AuthStrategy,
}

impl AuthorizationMiddleware {
    pub fn new(config: AuthorizationConfig) -> Result<Self, MiddlewareError> {
        Self::build(config, None)
    }

    /// 외부 검증 함수를 사용하는 인증 미들웨어를 생성합니다.
    pub fn with_validator(
        config: AuthorizationConfig,
        validator: AuthValidator,
    ) -> Result<Self, MiddlewareError> {
        Self::build(config, Some(validator))
    }

    fn build(
        config: AuthorizationConfig,
        validator: Option<AuthValidator>,
    ) -> Result<Self, MiddlewareError> {
        let config = config.normalized();
        let header = HeaderName::from_bytes(config.header.as_bytes())
            .map_err(|e| MiddlewareError::config(NAME, format!("잘못된 헤더 이름 '{}': {}", config.header, e)))?;
        let skip = PathMatcher::new(config.skip_paths.as_slice(), config.regex_skip_paths.as_slice())?;
        let strategy = AuthStrategy::from_config(&config, validator);

        match &strategy {
            AuthStrategy::Unsupported(method) => {
                warn!(method = %method, "지원하지 않는 인증 방식: 모든 요청이 거부됩니다");
            }
            s if s.is_disabled() => {
                warn!(method = %config.method, "인증 자격증명이 설정되지 않아 모든 요청이 허용됩니다");
            }
            _ => {}
        }

        Ok(Self {
            header,
            object_response: config.object_response,
            skip,
            strategy,
        })
    }

    pub fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// 요청을 검증합니다. 예외 경로는 항상 통과합니다.
    pub fn authorize(&self, req: &Request) -> Result<(), AuthFailure> {
        if self.skip.is_exempt(req.uri().path()) {
            return Ok(());
        }

        // 헤더가 없으면 빈 문자열로 취급
        let value = match req.headers().get(&self.header) {
            None => "",
            Some(value) => value.to_str().map_err(|_| AuthFailure::InvalidAuth)?,
        };

        self.strategy.verify(value)
    }
}

#[async_trait]
impl Middleware for AuthorizationMiddleware {
    fn name(&self) -> &str {
        NAME
    }

    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response, MiddlewareError> {
        if let Err(failure) = self.authorize(&req) {
            debug!(path = %req.uri().path(), reason = %failure, "인증 실패");
            return Ok(rejection(StatusCode::FORBIDDEN, &self.object_response, failure.message()));
        }

        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    fn request(path: &str, auth: Option<&str>) -> Request {
        let mut builder = hyper::Request::builder().uri(path);
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    #[test]
    fn test_skip_paths() {
        let middleware = AuthorizationMiddleware::new(AuthorizationConfig {
            regex_skip_paths: vec![r"^/public/".to_string()],
            ..AuthorizationConfig::bearer("123456789")
        })
        .unwrap();

        assert_eq!(middleware.authorize(&request("/ping", None)), Ok(()));
        assert_eq!(middleware.authorize(&request("/public/logo.png", None)), Ok(()));
        assert_eq!(middleware.authorize(&request("/private", None)), Err(AuthFailure::InvalidAuth));
    }

    #[test]
    fn test_custom_header() {
        let middleware = AuthorizationMiddleware::new(AuthorizationConfig {
            header: "X-Api-Key".to_string(),
            ..AuthorizationConfig::bearer("k")
        })
        .unwrap();

        let req = hyper::Request::builder()
            .uri("/items")
            .header("x-api-key", "k")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(middleware.authorize(&req), Ok(()));
        assert_eq!(middleware.authorize(&request("/items", Some("Bearer k"))), Err(AuthFailure::InvalidAuth));
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let result = AuthorizationMiddleware::new(AuthorizationConfig {
            header: "bad header".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(MiddlewareError::Config { .. })));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let result = AuthorizationMiddleware::new(AuthorizationConfig {
            regex_skip_paths: vec!["^[".to_string()],
            ..Default::default()
        });
        assert!(matches!(result, Err(MiddlewareError::InvalidPattern { .. })));
    }
}
