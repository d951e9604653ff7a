//! CORS 미들웨어
//!
//! 예외 경로가 아닌 응답에 교차 출처 정책 헤더를 설정합니다.

mod config;
mod middleware;

pub use config::{CorsConfig, DEFAULT_CORS_HEADERS};
pub use middleware::CorsMiddleware;
