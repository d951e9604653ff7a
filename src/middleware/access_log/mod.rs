//! 접근 로그 미들웨어
//!
//! 설정된 태그로 요청/응답 값을 추출해 출력 대상으로 보냅니다.

mod config;
mod extractor;
mod middleware;
mod sink;

pub use config::AccessLogConfig;
pub use extractor::{
    is_form, resolve, AccessRecord, Exchange, FieldExtractor, FieldValue, RequestSnapshot, Tag,
    HEADER_X_REQUEST_ID,
};
pub use middleware::AccessLogMiddleware;
pub use sink::{AccessLogSink, MemorySink, TracingSink, WriterSink};
