use std::future::Future;

use async_trait::async_trait;

use super::{MiddlewareError, Next, Request, Response};

/// 미들웨어 트레이트
///
/// 요청을 검사하고 `next.run(req)`로 다음 단계를 호출하거나,
/// 호출하지 않고 직접 응답을 반환해 체인을 중단합니다.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// 미들웨어의 고유 이름을 반환합니다.
    fn name(&self) -> &str;

    /// HTTP 요청을 처리합니다.
    async fn handle(&self, req: Request, next: Next<'_>) -> Result<Response, MiddlewareError>;
}

/// 체인의 마지막에서 실행되는 최종 핸들러
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request) -> Response;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send,
{
    async fn call(&self, req: Request) -> Response {
        (self)(req).await
    }
}
