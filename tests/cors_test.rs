use bytes::Bytes;
use http_body_util::Full;
use hyper::StatusCode;

use http_middlewares::middleware::cors::{CorsConfig, CorsMiddleware};
use http_middlewares::middleware::{MiddlewareChain, Request, Response};

fn request(path: &str, origin: &str) -> Request {
    hyper::Request::builder()
        .uri(path)
        .header("Origin", origin)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn run(config: CorsConfig, path: &str) -> Response {
    run_from(config, path, "https://app.example.com").await
}

async fn run_from(config: CorsConfig, path: &str, origin: &str) -> Response {
    let mut chain = MiddlewareChain::new();
    chain.add(CorsMiddleware::new(config).unwrap());

    let endpoint = |_req: Request| async {
        hyper::Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Access-Control-Allow-Origin", "https://stale.example.com")
            .body(Full::new(Bytes::new()))
            .unwrap()
    };
    chain.handle(request(path, origin), &endpoint).await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_applied_after_endpoint() {
        let res = run(CorsConfig::default(), "/anything").await;

        // 응답 상태는 바꾸지 않습니다.
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let headers = res.headers();
        assert_eq!(headers.get_all("access-control-allow-origin").iter().count(), 1);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["access-control-allow-methods"], "GET,POST,PUT,DELETE,OPTIONS");
        assert!(headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .starts_with("Authentication,Content-Type"));
    }

    #[tokio::test]
    async fn test_configured_values() {
        let config = CorsConfig {
            allow_origins: vec!["https://a.com".to_string(), "https://b.com".to_string(), "https://a.com".to_string()],
            allow_methods: vec!["GET".to_string()],
            allow_headers: vec!["X-Token".to_string()],
            allow_credentials: false,
            ..Default::default()
        };
        let res = run(config, "/").await;

        let headers = res.headers();
        // 목록에 없는 Origin이면 첫 번째 항목 하나만 보냅니다.
        assert_eq!(headers["access-control-allow-origin"], "https://a.com");
        assert_eq!(headers["vary"], "Origin");
        assert_eq!(headers["access-control-allow-methods"], "GET");
        assert_eq!(headers["access-control-allow-headers"], "X-Token");
        assert!(headers.get("access-control-allow-credentials").is_none());
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed() {
        let config = CorsConfig {
            allow_origins: vec!["https://a.com".to_string(), "https://b.com".to_string()],
            ..Default::default()
        };

        let res = run_from(config.clone(), "/", "https://b.com").await;
        assert_eq!(res.headers().get_all("access-control-allow-origin").iter().count(), 1);
        assert_eq!(res.headers()["access-control-allow-origin"], "https://b.com");

        let res = run_from(config, "/", "https://a.com").await;
        assert_eq!(res.headers()["access-control-allow-origin"], "https://a.com");
    }

    #[tokio::test]
    async fn test_wildcard_ignores_request_origin() {
        let config = CorsConfig {
            allow_origins: vec!["https://a.com".to_string(), "*".to_string()],
            ..Default::default()
        };

        let res = run_from(config, "/", "https://b.com").await;
        assert_eq!(res.headers()["access-control-allow-origin"], "*");
        assert!(res.headers().get("vary").is_none());
    }

    #[tokio::test]
    async fn test_skip_paths_leave_response_untouched() {
        let config = CorsConfig {
            skip_paths: vec!["/health".to_string()],
            regex_skip_paths: vec!["^/static/".to_string()],
            ..Default::default()
        };

        for path in ["/health", "/static/app.js"] {
            let res = run(config.clone(), path).await;
            assert_eq!(res.headers()["access-control-allow-origin"], "https://stale.example.com", "경로: {}", path);
            assert!(res.headers().get("access-control-allow-methods").is_none());
        }
    }

    #[test]
    fn test_invalid_header_value_fails() {
        let config = CorsConfig {
            allow_origins: vec!["bad\nvalue".to_string()],
            ..Default::default()
        };
        assert!(CorsMiddleware::new(config).is_err());
    }
}
