//! HTTP 요청 가로채기 미들웨어 모음입니다.
//!
//! # 주요 기능
//!
//! - bearer/basic/외부 검증 함수 기반 인증
//! - CORS 응답 헤더 설정
//! - Swagger/OpenAPI 문서 기반 요청 스키마 검증
//! - 태그 기반 접근 로그
//! - 순서가 있는 미들웨어 체인과 단락(short-circuit) 처리
//!
//! # 예제
//!
//! ```
//! use http_middlewares::middleware::MiddlewareChain;
//! use http_middlewares::middleware::authorization::{AuthorizationConfig, AuthorizationMiddleware};
//! use http_middlewares::middleware::cors::{CorsConfig, CorsMiddleware};
//!
//! let mut chain = MiddlewareChain::new();
//! chain.add(CorsMiddleware::new(CorsConfig::default()).unwrap());
//! chain.add(AuthorizationMiddleware::new(AuthorizationConfig::bearer("secret")).unwrap());
//!
//! assert_eq!(chain.names(), vec!["cors", "authorization"]);
//! ```

pub mod logging;
pub mod middleware;
pub mod server;
pub mod settings;
