use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;
use tokio::net::TcpListener;
use tracing::{error, info};

use http_middlewares::logging::init_logging;
use http_middlewares::middleware::{Handler, MiddlewareManager, Request, Response};
use http_middlewares::server;
use http_middlewares::settings::Settings;

async fn endpoint(req: Request) -> Response {
    match req.uri().path() {
        "/ping" => Response::new(Full::new(Bytes::from("pong"))),
        _ => {
            let mut res = Response::new(Full::new(Bytes::from("not found")));
            *res.status_mut() = StatusCode::NOT_FOUND;
            res
        }
    }
}

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let _guard = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("로깅 초기화 실패: {}", e);
            std::process::exit(1);
        }
    };

    let manager = match MiddlewareManager::new(&settings.middlewares) {
        Ok(manager) => manager,
        Err(e) => {
            error!(error = %e, "미들웨어 체인 구성 실패");
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(settings.server.addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, addr = %settings.server.addr(), "포트 바인딩 실패");
            std::process::exit(1);
        }
    };

    info!(addr = %settings.server.addr(), "서버 시작");
    let endpoint: Arc<dyn Handler> = Arc::new(endpoint);
    if let Err(e) = server::serve(listener, Arc::new(manager.into_chain()), endpoint).await {
        error!(error = %e, "서버 종료");
        std::process::exit(1);
    }
}
