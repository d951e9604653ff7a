use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::StatusCode;
use tracing::{debug, error};

use crate::middleware::{
    handle_middleware_error, rejection, ClientAddr, Handler, MiddlewareChain, Request, Response,
};

/// 연결 하나의 요청을 미들웨어 체인과 최종 핸들러로 처리합니다.
pub struct RequestHandler {
    chain: Arc<MiddlewareChain>,
    endpoint: Arc<dyn Handler>,
}

impl RequestHandler {
    pub fn new(chain: Arc<MiddlewareChain>, endpoint: Arc<dyn Handler>) -> Self {
        Self { chain, endpoint }
    }

    pub async fn handle_request(
        &self,
        peer: SocketAddr,
        req: hyper::Request<Incoming>,
    ) -> Result<Response, std::convert::Infallible> {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                error!(error = %e, "요청 본문 수신 실패");
                return Ok(rejection(StatusCode::BAD_REQUEST, "middlewares.server", "invalid request body"));
            }
        };

        let mut req = Request::from_parts(parts, Full::<Bytes>::new(body));
        req.extensions_mut().insert(ClientAddr(peer));
        debug!(method = %req.method(), path = %req.uri().path(), "요청 처리 시작");

        match self.chain.handle(req, self.endpoint.as_ref()).await {
            Ok(response) => Ok(response),
            Err(e) => Ok(handle_middleware_error(e)),
        }
    }

    pub async fn handle_connection<I>(&self, io: I, peer: SocketAddr) -> Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(peer, req)))
            .await
    }
}
