use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::StatusCode;
use tracing::trace;

use crate::middleware::{Middleware, MiddlewareError, Next, PathMatcher, Request, Response};
use super::config::AccessLogConfig;
use super::extractor::{is_form, Exchange, FieldExtractor, RequestSnapshot};
use super::sink::{AccessLogSink, TracingSink};

const NAME: &str = "access-log";

/// 요청마다 한 건의 접근 로그를 남기는 미들웨어
///
/// 요청을 거부하지 않으며, 다음 단계가 실패하면 500 상태로 기록한 뒤 오류를 그대로 전달합니다.
pub struct AccessLogMiddleware {
    skip: PathMatcher,
    extractor: FieldExtractor,
    sink: Arc<dyn AccessLogSink>,
}

impl AccessLogMiddleware {
    pub fn new(config: AccessLogConfig, sink: Arc<dyn AccessLogSink>) -> Result<Self, MiddlewareError> {
        let skip = PathMatcher::new(config.skip_paths.as_slice(), config.regex_skip_paths.as_slice())?;

        Ok(Self {
            skip,
            extractor: FieldExtractor::new(&config.fields),
            sink,
        })
    }

    /// tracing으로 기록하는 미들웨어를 생성합니다.
    pub fn with_tracing(config: AccessLogConfig) -> Result<Self, MiddlewareError> {
        Self::new(config, Arc::new(TracingSink))
    }

    async fn capture(&self, req: Request) -> (Request, RequestSnapshot) {
        if !self.extractor.needs_form() || !is_form(req.headers()) {
            let snapshot = RequestSnapshot::capture(&req, None);
            return (req, snapshot);
        }

        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();
        let req = Request::from_parts(parts, Full::<Bytes>::new(body.clone()));
        let snapshot = RequestSnapshot::capture(&req, Some(&body));
        (req, snapshot)
    }
}

#[async_trait]
impl Middleware for AccessLogMiddleware {
    fn name(&self) -> &str {
        NAME
    }

    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response, MiddlewareError> {
        if self.skip.is_exempt(req.uri().path()) {
            return next.run(req).await;
        }

        let start = Instant::now();
        let (req, snapshot) = self.capture(req).await;

        let result = next.run(req).await;
        let latency = start.elapsed();

        let record = match &result {
            Ok(response) => self.extractor.extract(&Exchange::new(&snapshot, response, latency)),
            Err(_) => {
                let mut failed = Response::new(Full::new(Bytes::new()));
                *failed.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                self.extractor.extract(&Exchange::new(&snapshot, &failed, latency))
            }
        };

        trace!(fields = record.len(), "접근 로그 기록");
        self.sink.emit(&record);

        result
    }
}
