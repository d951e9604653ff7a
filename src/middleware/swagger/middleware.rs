use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::StatusCode;
use tracing::{debug, info};

use crate::middleware::{
    rejection, Middleware, MiddlewareError, Next, PathMatcher, Request, Response,
};
use super::config::SwaggerValidatorConfig;
use super::document::OpenApiDocument;
use super::validator::RequestValidator;

const NAME: &str = "swagger-validator";

/// 요청 스키마 검증 미들웨어
///
/// 검증에 실패하면 400 응답으로 체인을 중단합니다.
pub struct SwaggerValidatorMiddleware {
    object_response: String,
    skip: PathMatcher,
    validator: Arc<dyn RequestValidator>,
}

impl SwaggerValidatorMiddleware {
    /// 설정된 문서를 읽어 미들웨어를 생성합니다.
    ///
    /// 문서를 읽지 못하면 어떤 요청도 처리할 수 없으므로 생성이 실패합니다.
    pub fn new(config: SwaggerValidatorConfig) -> Result<Self, MiddlewareError> {
        let config = config.normalized();
        let document = OpenApiDocument::from_file(&config.document)
            .map_err(|e| MiddlewareError::config(NAME, e.to_string()))?;
        info!(document = %config.document, operations = document.len(), "스키마 문서 로드 완료");

        Self::with_validator(config, Arc::new(document))
    }

    /// 외부 검증기를 사용하는 미들웨어를 생성합니다.
    pub fn with_validator(
        config: SwaggerValidatorConfig,
        validator: Arc<dyn RequestValidator>,
    ) -> Result<Self, MiddlewareError> {
        let config = config.normalized();
        let skip = PathMatcher::new(config.skip_paths.as_slice(), config.regex_skip_paths.as_slice())?;

        Ok(Self {
            object_response: config.object_response,
            skip,
            validator,
        })
    }
}

#[async_trait]
impl Middleware for SwaggerValidatorMiddleware {
    fn name(&self) -> &str {
        NAME
    }

    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response, MiddlewareError> {
        if self.skip.is_exempt(req.uri().path()) {
            return next.run(req).await;
        }

        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();

        if let Err(e) = self.validator.validate(&parts, &body) {
            debug!(path = %parts.uri.path(), error = %e, "스키마 검증 실패");
            return Ok(rejection(StatusCode::BAD_REQUEST, &self.object_response, e.message()));
        }

        next.run(Request::from_parts(parts, Full::<Bytes>::new(body))).await
    }
}
