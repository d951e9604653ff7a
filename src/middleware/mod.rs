//! 요청 가로채기 미들웨어
//!
//! 각 미들웨어는 요청을 검사한 뒤 `Next`로 다음 단계를 호출하거나 직접 응답해 체인을 중단합니다.

use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;

pub mod access_log;
pub mod authorization;
pub mod chain;
pub mod config;
pub mod cors;
pub mod error;
pub mod manager;
pub mod matcher;
pub mod response;
pub mod swagger;
pub mod traits;

pub use chain::{MiddlewareChain, Next};
pub use config::{MiddlewareConfig, MiddlewareType};
pub use error::MiddlewareError;
pub use manager::MiddlewareManager;
pub use matcher::PathMatcher;
pub use response::{handle_middleware_error, json_response, rejection, Rejection};
pub use traits::{Handler, Middleware};

pub type Request = hyper::Request<Full<Bytes>>;
pub type Response = hyper::Response<Full<Bytes>>;

/// 연결된 클라이언트 주소. 서버가 요청 extension으로 넣어 둡니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);
