use tracing::trace;

use super::{Handler, Middleware, MiddlewareError, Request, Response};

/// 남은 미들웨어와 최종 핸들러를 가리키는 커서
///
/// `run`을 호출하지 않으면 이후 단계는 실행되지 않습니다.
pub struct Next<'a> {
    middlewares: &'a [Box<dyn Middleware>],
    endpoint: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(middlewares: &'a [Box<dyn Middleware>], endpoint: &'a dyn Handler) -> Self {
        Self { middlewares, endpoint }
    }

    /// 체인의 나머지를 실행합니다.
    pub async fn run(self, req: Request) -> Result<Response, MiddlewareError> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                trace!(middleware = current.name(), "미들웨어 실행");
                current.handle(req, Next::new(rest, self.endpoint)).await
            }
            None => Ok(self.endpoint.call(req).await),
        }
    }
}

#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new()
        }
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn add_boxed(&mut self, middleware: Box<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// 등록 순서대로 미들웨어 이름을 반환합니다.
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// 요청을 등록 순서대로 미들웨어에 통과시킨 뒤 최종 핸들러를 호출합니다.
    pub async fn handle(
        &self,
        request: Request,
        endpoint: &dyn Handler,
    ) -> Result<Response, MiddlewareError> {
        Next::new(&self.middlewares, endpoint).run(request).await
    }
}
