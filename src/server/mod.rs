//! HTTP/1 서버 어댑터

pub mod handler;

use std::sync::Arc;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::middleware::{Handler, MiddlewareChain};
pub use handler::RequestHandler;

/// 리스너에서 연결을 받아 체인을 실행합니다. 수락 오류는 기록만 하고 계속 진행합니다.
pub async fn serve(
    listener: TcpListener,
    chain: Arc<MiddlewareChain>,
    endpoint: Arc<dyn Handler>,
) -> std::io::Result<()> {
    let handler = Arc::new(RequestHandler::new(chain, endpoint));
    info!(addr = %listener.local_addr()?, "HTTP 리스너 시작");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let handler = handler.clone();
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    if let Err(err) = handler.handle_connection(io, peer).await {
                        error!(error = %err, %peer, "HTTP 연결 처리 실패");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "HTTP 연결 수락 실패");
            }
        }
    }
}
