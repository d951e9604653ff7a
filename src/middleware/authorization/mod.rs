//! 인증 미들웨어
//!
//! bearer 토큰, basic 자격증명 또는 외부 검증 함수로 요청을 인증합니다.

mod config;
mod middleware;
mod strategy;

pub use config::{AuthorizationConfig, DEFAULT_AUTH_HEADER, OBJECT_AUTHENTICATION};
pub use middleware::AuthorizationMiddleware;
pub use strategy::{AuthFailure, AuthScheme, AuthStrategy, AuthValidator, BasicCredentials, Password};
