use async_trait::async_trait;
use hyper::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::middleware::{Middleware, MiddlewareError, Next, PathMatcher, Request, Response};
use super::config::CorsConfig;

const NAME: &str = "cors";
const WILDCARD: &str = "*";

/// 허용 Origin 정책
#[derive(Debug, Clone, PartialEq)]
enum AllowOrigin {
    /// 목록에 `*`가 있으면 모든 Origin을 허용합니다.
    Any,
    /// 허용 목록. 첫 번째 항목이 기본값입니다.
    List(Vec<HeaderValue>),
}

impl AllowOrigin {
    fn from_config(origins: &[String]) -> Result<Self, MiddlewareError> {
        if origins.iter().any(|origin| origin == WILDCARD) {
            return Ok(Self::Any);
        }

        let mut list: Vec<HeaderValue> = Vec::with_capacity(origins.len());
        for origin in origins {
            let value = HeaderValue::from_str(origin).map_err(|e| {
                MiddlewareError::config(NAME, format!("allow_origins 값 '{}' 오류: {}", origin, e))
            })?;
            if !list.contains(&value) {
                list.push(value);
            }
        }

        if list.is_empty() {
            return Ok(Self::Any);
        }
        Ok(Self::List(list))
    }

    /// 응답에 쓸 Origin 값 하나를 고릅니다.
    ///
    /// 요청 Origin이 목록에 있으면 그대로 돌려주고, 아니면 첫 번째 항목을 사용합니다.
    fn resolve(&self, request_origin: Option<&HeaderValue>) -> HeaderValue {
        match self {
            Self::Any => HeaderValue::from_static(WILDCARD),
            Self::List(list) => request_origin
                .and_then(|origin| list.iter().find(|allowed| *allowed == origin))
                .or_else(|| list.first())
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(WILDCARD)),
        }
    }
}

/// CORS 미들웨어
///
/// 다음 단계가 끝난 뒤 응답에 CORS 헤더를 설정합니다. 요청을 거부하지 않습니다.
#[derive(Debug)]
pub struct CorsMiddleware {
    skip: PathMatcher,
    allow_origin: AllowOrigin,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
}

impl CorsMiddleware {
    pub fn new(config: CorsConfig) -> Result<Self, MiddlewareError> {
        let config = config.normalized();
        let skip = PathMatcher::new(config.skip_paths.as_slice(), config.regex_skip_paths.as_slice())?;

        Ok(Self {
            skip,
            allow_origin: AllowOrigin::from_config(&config.allow_origins)?,
            allow_methods: header_value("allow_methods", &config.allow_methods)?,
            allow_headers: header_value("allow_headers", &config.allow_headers)?,
            allow_credentials: config.allow_credentials,
        })
    }

    /// CORS 헤더 설정
    ///
    /// CORS 헤더는 덮어쓰기 방식으로 한 번만 설정되고, `Vary`에는 추가됩니다.
    fn set_cors_headers(&self, headers: &mut HeaderMap, request_origin: Option<&HeaderValue>) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.resolve(request_origin));
        if let AllowOrigin::List(_) = self.allow_origin {
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }

        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
    }
}

/// 목록을 중복 없이 쉼표로 연결한 헤더 값을 만듭니다.
fn header_value(field: &str, values: &[String]) -> Result<HeaderValue, MiddlewareError> {
    let mut unique: Vec<&str> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value.as_str()) {
            unique.push(value);
        }
    }

    let joined = unique.join(",");
    HeaderValue::from_str(&joined)
        .map_err(|e| MiddlewareError::config(NAME, format!("{} 값 '{}' 오류: {}", field, joined, e)))
}

#[async_trait]
impl Middleware for CorsMiddleware {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip(self, req, next), fields(path = %req.uri().path()))]
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response, MiddlewareError> {
        let exempt = self.skip.is_exempt(req.uri().path());
        let origin = req.headers().get(header::ORIGIN).cloned();

        let mut res = next.run(req).await?;

        if !exempt {
            debug!("CORS 응답 헤더 설정");
            self.set_cors_headers(res.headers_mut(), origin.as_ref());
        }

        Ok(res)
    }
}
