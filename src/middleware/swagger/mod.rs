//! 요청 스키마 검증 미들웨어
//!
//! Swagger/OpenAPI 문서 또는 외부 검증기로 요청을 검사합니다.

mod config;
mod document;
mod middleware;
mod validator;

pub use config::{SwaggerValidatorConfig, DEFAULT_DOCUMENT, OBJECT_SWAGGER_VALIDATOR};
pub use document::{DocumentError, OpenApiDocument};
pub use middleware::SwaggerValidatorMiddleware;
pub use validator::{RequestValidator, SchemaError};
