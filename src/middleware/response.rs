use hyper::{header, Response, StatusCode};
use http_body_util::Full;
use bytes::Bytes;
use serde::Serialize;
use tracing::error;
use super::MiddlewareError;

const OBJECT_PIPELINE: &str = "middlewares.pipeline";

/// 거부 응답 본문
///
/// `object`는 클라이언트가 프로그램적으로 분기할 수 있는 고정 식별자입니다.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rejection<'a> {
    pub object: &'a str,
    pub error: &'a str,
}

/// JSON 본문을 가진 응답을 생성합니다.
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response<Full<Bytes>> {
    let body = match serde_json::to_vec(payload) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "응답 직렬화 실패");
            return plain_internal_error();
        }
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| plain_internal_error())
}

/// 체인을 중단하는 거부 응답을 생성합니다.
pub fn rejection(status: StatusCode, object: &str, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &Rejection { object, error: message })
}

/// 미들웨어 내부 오류를 HTTP 응답으로 변환합니다.
///
/// 오류 내용은 로그로만 남기고 응답 본문에는 노출하지 않습니다.
pub fn handle_middleware_error(err: MiddlewareError) -> Response<Full<Bytes>> {
    error!(error = %err, "미들웨어 처리 실패");
    rejection(StatusCode::INTERNAL_SERVER_ERROR, OBJECT_PIPELINE, "internal error")
}

fn plain_internal_error() -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from("Internal Server Error")));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}
